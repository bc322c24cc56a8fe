//! The fixed rubric every document is checked against

use shared_types::{SectionKind, Verdict};

/// Page-one formatting requirements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatRubric {
    /// Substring that must appear in at least one font name (case-sensitive)
    pub font_family: &'static str,
    /// Rounded point size that must appear at least once
    pub font_size: i64,
    /// Minimum distance in points from every page edge
    pub margin: f32,
}

impl FormatRubric {
    pub const STANDARD: FormatRubric = FormatRubric {
        font_family: "Times",
        font_size: 12,
        margin: 72.0,
    };
}

/// A required section: the keywords that open it and how long it may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRule {
    pub kind: SectionKind,
    /// Lowercase substrings matched against lowercased page text
    pub keywords: &'static [&'static str],
    pub max_pages: u32,
}

impl SectionRule {
    /// `text` must already be lowercase
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| text.contains(kw))
    }

    /// A section passes when it spans at least one page and no more than
    /// its maximum
    pub fn verdict(&self, pages: u32) -> Verdict {
        Verdict::from_bool(pages > 0 && pages <= self.max_pages)
    }
}

/// Section rules in evaluation order.
///
/// When a page matches several rules the last one in this order becomes the
/// current section.
pub const SECTION_RULES: [SectionRule; 3] = [
    SectionRule {
        kind: SectionKind::TechnicalRequirements,
        keywords: &["technical requirements"],
        max_pages: 8,
    },
    SectionRule {
        kind: SectionKind::Budget,
        keywords: &["budget"],
        max_pages: 4,
    },
    SectionRule {
        kind: SectionKind::Qualification,
        keywords: &["qualification"],
        max_pages: 4,
    },
];

pub fn rule_for(kind: SectionKind) -> &'static SectionRule {
    match kind {
        SectionKind::TechnicalRequirements => &SECTION_RULES[0],
        SectionKind::Budget => &SECTION_RULES[1],
        SectionKind::Qualification => &SECTION_RULES[2],
    }
}
