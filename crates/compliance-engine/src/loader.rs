//! Document loading: extension gate, then parse
//!
//! Every way a source can fail to become a document is a [`Rejection`],
//! which the analyzer reports as `file_type = "fail"`.

use std::path::Path;

use shared_pdf::{PdfDocument, PdfError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Rejection {
    #[error("not a .pdf source: {0}")]
    Extension(String),

    #[error("unreadable PDF: {0}")]
    Unparseable(#[from] PdfError),

    #[error("document has no pages")]
    NoPages,
}

/// True if `name` ends with `.pdf`, ignoring ASCII case
pub fn has_pdf_extension(name: &str) -> bool {
    name.len() >= 4
        && name.is_char_boundary(name.len() - 4)
        && name[name.len() - 4..].eq_ignore_ascii_case(".pdf")
}

/// Open a document from memory. `source_name` is only used for the
/// extension check.
pub fn load_bytes(source_name: &str, bytes: &[u8]) -> Result<PdfDocument, Rejection> {
    if !has_pdf_extension(source_name) {
        return Err(Rejection::Extension(source_name.to_string()));
    }
    non_empty(PdfDocument::from_bytes(bytes)?)
}

/// Open a document from disk. The file is not read if its name fails the
/// extension check.
pub fn load_file(path: &Path) -> Result<PdfDocument, Rejection> {
    let name = path.to_string_lossy();
    if !has_pdf_extension(&name) {
        return Err(Rejection::Extension(name.into_owned()));
    }
    non_empty(PdfDocument::open(path)?)
}

fn non_empty(doc: PdfDocument) -> Result<PdfDocument, Rejection> {
    if doc.page_count() == 0 {
        return Err(Rejection::NoPages);
    }
    Ok(doc)
}
