//! Document compliance analysis
//!
//! Checks a PDF against a fixed rubric: page-one typography and margins,
//! plus the presence and length of required sections across all pages.
//!
//! ```no_run
//! use compliance_engine::ComplianceEngine;
//!
//! let report = ComplianceEngine::new().check_file("proposal.pdf".as_ref());
//! println!("{}", serde_json::to_string(&report).unwrap());
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod loader;
pub mod rubric;
pub mod sections;
pub mod typography;

pub use analyzer::ComplianceEngine;
pub use config::AnalyzerConfig;
pub use error::AnalysisError;
pub use shared_types::ComplianceReport;
