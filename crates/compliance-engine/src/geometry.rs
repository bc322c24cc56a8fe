//! Margin check for a single page

use shared_pdf::{BBox, Block, PageLayout};
use shared_types::Verdict;

use crate::rubric::FormatRubric;

/// The first block reaching into the margin, if any
pub fn first_violation(page: &PageLayout, inset: f32) -> Option<&Block> {
    page.blocks
        .iter()
        .find(|block| !inside(&block.bbox, page.width, page.height, inset))
}

fn inside(bbox: &BBox, width: f32, height: f32, inset: f32) -> bool {
    bbox.x0 >= inset && bbox.y0 >= inset && bbox.x1 <= width - inset && bbox.y1 <= height - inset
}

/// Pass when every block lies inside the inset. A page with no blocks passes.
pub fn margin(page: &PageLayout, rubric: &FormatRubric) -> Verdict {
    match first_violation(page, rubric.margin) {
        Some(block) => {
            tracing::debug!(
                page = page.number,
                bbox = ?block.bbox,
                "Block crosses the margin"
            );
            Verdict::Fail
        }
        None => Verdict::Pass,
    }
}
