//! Trigger-to-job domain primitives for the stitch pipeline stage.
//!
//! This crate owns key parsing, sibling discovery over an abstract lister,
//! deterministic ordering, and the job bundle contract. It intentionally
//! excludes AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod discovery;
pub mod error;
pub mod job;
pub mod key;
pub mod ordering;
