use thiserror::Error;

/// Failures that leave no rubric key to report them under
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis timeout after {0}ms")]
    Timeout(u64),

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
}
