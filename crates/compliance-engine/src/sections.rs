//! Section classification across pages
//!
//! Pages are folded, in order, into a [`SectionTally`]. A page whose text
//! mentions a section's keywords makes that section current; every page
//! (matching or not) is then counted toward the current section. Pages
//! before the first match belong to no section.

use shared_types::SectionKind;

use crate::rubric::SECTION_RULES;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTally {
    current: Option<SectionKind>,
    pages: [u32; 3],
    found: [bool; 3],
}

fn slot(kind: SectionKind) -> usize {
    match kind {
        SectionKind::TechnicalRequirements => 0,
        SectionKind::Budget => 1,
        SectionKind::Qualification => 2,
    }
}

impl SectionTally {
    /// Fold one page's text into the tally
    pub fn observe(mut self, page_text: &str) -> Self {
        let text = page_text.to_lowercase();
        for rule in &SECTION_RULES {
            if rule.matches(&text) {
                self.found[slot(rule.kind)] = true;
                self.current = Some(rule.kind);
            }
        }
        if let Some(kind) = self.current {
            self.pages[slot(kind)] += 1;
        }
        self
    }

    pub fn current(&self) -> Option<SectionKind> {
        self.current
    }

    pub fn pages(&self, kind: SectionKind) -> u32 {
        self.pages[slot(kind)]
    }

    /// True once any page has matched the section's keywords
    pub fn found(&self, kind: SectionKind) -> bool {
        self.found[slot(kind)]
    }
}

/// Classify a sequence of page texts
pub fn classify<I, S>(pages: I) -> SectionTally
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .fold(SectionTally::default(), |tally, text| tally.observe(text.as_ref()))
}
