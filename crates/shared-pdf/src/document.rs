//! Loaded PDF documents and per-page layout extraction

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::content::interpret;
use crate::coords::{BBox, PageFrame, DEFAULT_PAGE_BOX};
use crate::error::PdfError;
use crate::layout::PageLayout;
use crate::objects::{inherited, resolve_dict};

/// How far into the file the `%PDF-` marker may appear
const HEADER_SEARCH_WINDOW: usize = 1024;

/// A parsed PDF with its pages in document order
pub struct PdfDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("pages", &self.page_ids.len())
            .finish()
    }
}

impl PdfDocument {
    /// Parse a PDF from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
        if !window.windows(5).any(|w| w == b"%PDF-") {
            return Err(PdfError::ParseError("missing %PDF- header".into()));
        }

        let doc = Document::load_mem(bytes).map_err(|e| PdfError::ParseError(e.to_string()))?;
        let page_ids = doc.get_pages().into_values().collect();

        Ok(Self { doc, page_ids })
    }

    /// Read and parse a PDF file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    fn page_id(&self, number: u32) -> Result<ObjectId, PdfError> {
        number
            .checked_sub(1)
            .and_then(|idx| self.page_ids.get(idx as usize))
            .copied()
            .ok_or(PdfError::PageNotFound(number))
    }

    /// Visible box and rotation of a page (1-based).
    ///
    /// Uses `/CropBox`, then `/MediaBox`, then US Letter.
    pub fn frame(&self, number: u32) -> Result<PageFrame, PdfError> {
        let page_id = self.page_id(number)?;
        let page_box = [b"CropBox".as_slice(), b"MediaBox".as_slice()]
            .into_iter()
            .find_map(|key| match inherited(&self.doc, page_id, key) {
                Some(Object::Array(values)) => BBox::from_pdf_array(values),
                _ => None,
            })
            .unwrap_or(DEFAULT_PAGE_BOX);
        let rotate = match inherited(&self.doc, page_id, b"Rotate") {
            Some(Object::Integer(r)) => *r,
            Some(Object::Real(r)) => *r as i64,
            _ => 0,
        };
        Ok(PageFrame::new(page_box, rotate))
    }

    /// Extract the layout of a page (1-based)
    pub fn page(&self, number: u32) -> Result<PageLayout, PdfError> {
        let page_id = self.page_id(number)?;
        let frame = self.frame(number)?;
        let (width, height) = frame.size();

        let bytes = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| PdfError::ContentError {
                page: number,
                reason: e.to_string(),
            })?;
        let content = Content::decode(&bytes).map_err(|e| PdfError::ContentError {
            page: number,
            reason: e.to_string(),
        })?;
        let resources = inherited(&self.doc, page_id, b"Resources")
            .and_then(|obj| resolve_dict(&self.doc, obj));

        let painted = interpret(&self.doc, &content.operations, resources, &frame).map_err(
            |limit| PdfError::ContentError {
                page: number,
                reason: limit.to_string(),
            },
        )?;
        tracing::trace!(
            page = number,
            runs = painted.runs.len(),
            images = painted.images.len(),
            "Interpreted page content"
        );

        Ok(PageLayout::build(number, width, height, painted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{PageSpec, PdfBuilder, TextItem};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let err = PdfDocument::from_bytes(b"hello world").unwrap_err();
        assert!(matches!(err, PdfError::ParseError(_)));
    }

    #[test]
    fn test_rejects_truncated_pdf() {
        let err = PdfDocument::from_bytes(b"%PDF-1.7\n1 0 obj\n<<").unwrap_err();
        assert!(matches!(err, PdfError::ParseError(_)));
    }

    #[test]
    fn test_page_count_and_order() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::new().text(TextItem::new("first page")))
            .page(PageSpec::new().text(TextItem::new("second page")))
            .build();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(doc.page_count(), 2);

        let texts: Vec<String> = (1..=doc.page_count())
            .map(|n| doc.page(n).unwrap().text())
            .collect();
        assert_eq!(texts, vec!["first page", "second page"]);
    }

    #[test]
    fn test_page_out_of_range() {
        let bytes = PdfBuilder::new().page(PageSpec::new()).build();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        assert!(matches!(doc.page(0), Err(PdfError::PageNotFound(0))));
        assert!(matches!(doc.page(2), Err(PdfError::PageNotFound(2))));
    }

    #[test]
    fn test_span_font_and_size() {
        let bytes = PdfBuilder::new()
            .page(
                PageSpec::new()
                    .text(TextItem::new("Body").font("Times-Roman").size(12.0).at(72.0, 700.0)),
            )
            .build();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(1).unwrap();
        let span = page.spans().next().unwrap();
        assert_eq!(span.font_name, "Times-Roman");
        assert_eq!(span.font_size, 12.0);
        assert_eq!(span.text, "Body");
    }

    #[test]
    fn test_media_box_sets_page_size() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::new().media_box(0.0, 0.0, 595.0, 842.0))
            .build();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(1).unwrap();
        assert_eq!((page.width, page.height), (595.0, 842.0));
    }

    #[test]
    fn test_rotated_page_swaps_dimensions() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::new().rotate(90))
            .build();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(1).unwrap();
        assert_eq!((page.width, page.height), (792.0, 612.0));
    }

    #[test]
    fn test_image_is_reported_as_block() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::new().image(100.0, 100.0, 50.0, 50.0))
            .build();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let page = doc.page(1).unwrap();
        assert_eq!(page.blocks.len(), 1);
        let bbox = page.blocks[0].bbox;
        assert_eq!((bbox.x0, bbox.y0, bbox.x1, bbox.y1), (100.0, 642.0, 150.0, 692.0));
    }

    #[test]
    fn test_text_inside_form_xobject_is_found() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::new().form_text(TextItem::new("inside form").at(72.0, 500.0)))
            .build();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(doc.page(1).unwrap().text(), "inside form");
    }

    #[test]
    fn test_self_drawing_form_is_read_once() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::new().form_chain(TextItem::new("echo").at(72.0, 500.0), 1, 12))
            .build();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(doc.page(1).unwrap().text(), "echo");
    }

    #[test]
    fn test_runaway_form_nesting_is_a_content_error() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::new().form_chain(TextItem::new("fan"), 6, 12))
            .build();
        let doc = PdfDocument::from_bytes(&bytes).unwrap();
        let err = doc.page(1).unwrap_err();
        assert!(matches!(err, PdfError::ContentError { page: 1, .. }));
    }
}
