//! Core pipeline orchestration and domain logic for ClauseGuard.
//!
//! This crate ties together segmentation, clause analysis, compliance gap
//! detection, and document augmentation into one end-to-end workflow
//! ([`Pipeline::run`] / [`Pipeline::analyze_upload`]).

pub mod analyzer;
pub mod augment;
mod docx;
pub mod justification;
pub mod pipeline;

pub use analyzer::ClauseAnalyzer;
pub use augment::{build_augmented_document, render_augmented_document};
pub use justification::justify;
pub use pipeline::{Pipeline, ProgressReporter, SilentProgress};
