//! AWS-oriented adapters and handlers for the stitch trigger stage.
//!
//! This crate owns runtime integration details (the Lambda handler, storage
//! configuration, and the S3-compatible listing adapter) on top of the domain
//! primitives in `stitch_job_core`.

pub mod adapters;
pub mod handlers;
