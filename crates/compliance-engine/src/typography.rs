//! Font family and size collection for a single page

use std::collections::BTreeSet;

use shared_pdf::PageLayout;
use shared_types::Verdict;

use crate::rubric::FormatRubric;

/// Distinct font names and rounded sizes used on a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Typography {
    pub fonts: BTreeSet<String>,
    pub sizes: BTreeSet<i64>,
}

impl Typography {
    pub fn collect(page: &PageLayout) -> Self {
        let mut typography = Typography::default();
        for span in page.spans() {
            typography.fonts.insert(span.font_name.clone());
            typography.sizes.insert(round_size(span.font_size));
        }
        tracing::debug!(
            page = page.number,
            fonts = ?typography.fonts,
            sizes = ?typography.sizes,
            "Collected typography"
        );
        typography
    }

    pub fn font_family(&self, rubric: &FormatRubric) -> Verdict {
        Verdict::from_bool(self.fonts.iter().any(|f| f.contains(rubric.font_family)))
    }

    pub fn font_size(&self, rubric: &FormatRubric) -> Verdict {
        Verdict::from_bool(self.sizes.contains(&rubric.font_size))
    }
}

/// Round to the nearest whole point, ties to even (11.5 → 12, 12.5 → 12)
pub fn round_size(size: f32) -> i64 {
    f64::from(size).round_ties_even() as i64
}
