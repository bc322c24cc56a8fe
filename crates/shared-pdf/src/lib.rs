//! Shared PDF handling utilities
//!
//! This crate loads PDFs with lopdf, interprets page content streams and
//! reconstructs page layout (spans, lines and blocks with fonts, sizes and
//! page-space bounding boxes) for the analysis crates in the workspace.

mod cmap;
mod objects;

pub mod content;
pub mod coords;
pub mod document;
pub mod error;
pub mod fonts;
pub mod layout;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use coords::{BBox, PageFrame};
pub use document::PdfDocument;
pub use error::PdfError;
pub use layout::{Block, BlockKind, Line, PageLayout, Span};
