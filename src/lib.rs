// THEORY:
// This file is the main entry point for the `annotation_qa` library crate.
// It exposes the `AuditPipeline` and the pieces it is assembled from: task
// sources, the image fetcher, the per-annotation checks, and the CSV report.
//
// The binary in `main.rs` wires these together from environment configuration;
// tests and other callers can wire them together with their own sources and
// fetchers.

pub mod checks;
pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod task;

pub use pipeline::{AuditPipeline, AuditSummary, TaskReport};
