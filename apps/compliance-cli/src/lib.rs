//! Rendering and exit-status policy for the `pdf-compliance` binary

pub mod output;

pub use output::{exit_code, render, OutputFormat};
