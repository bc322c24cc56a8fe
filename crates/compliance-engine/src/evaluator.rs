//! Combines page-one findings and the section tally into a report

use shared_types::{ComplianceReport, ContentReport, FormatReport, SectionOutcome, Verdict};

use crate::rubric::SECTION_RULES;
use crate::sections::SectionTally;

/// Format verdicts taken from page one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOneFindings {
    pub font_family: Verdict,
    pub font_size: Verdict,
    pub margin: Verdict,
}

impl PageOneFindings {
    /// Used when page one cannot be read at all
    pub const UNREADABLE: PageOneFindings = PageOneFindings {
        font_family: Verdict::Fail,
        font_size: Verdict::Fail,
        margin: Verdict::Fail,
    };
}

/// Build the report for an opened document
pub fn evaluate(page_one: &PageOneFindings, tally: &SectionTally) -> ComplianceReport {
    let format = FormatReport {
        file_type: Verdict::Pass,
        font_family: Some(page_one.font_family),
        font_size: Some(page_one.font_size),
        margin: Some(page_one.margin),
    };

    let content = SECTION_RULES
        .iter()
        .fold(ContentReport::default(), |content, rule| {
            let pages = tally.pages(rule.kind);
            content.with_section(
                rule.kind,
                SectionOutcome {
                    pages,
                    verdict: rule.verdict(pages),
                },
            )
        });

    ComplianceReport { format, content }
}
