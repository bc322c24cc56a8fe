use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Page {0} does not exist")]
    PageNotFound(u32),

    #[error("Failed to read content of page {page}: {reason}")]
    ContentError { page: u32, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
