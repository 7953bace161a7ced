//! Report generation over a completed traversal
//!
//! The renderers consume the final completed map read-only and never touch
//! the filesystem, so any report can be re-run against the same result.

pub mod render;

pub use render::ReportGenerator;
