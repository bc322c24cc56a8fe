//! Report types shared between the compliance engine and its front ends
//!
//! Front ends consume [`ComplianceReport`] read-only and must not
//! reinterpret its pass/fail semantics.

pub mod types;

pub use types::{
    ComplianceReport, ContentReport, FormatReport, SectionKind, SectionOutcome, Verdict,
};
