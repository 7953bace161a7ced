//! Error types for disk-walker
//!
//! This module defines the error hierarchy covering:
//! - Directory and entry scan errors
//! - Configuration and CLI errors
//! - Report rendering errors
//! - Worker thread errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Every error carries the path it relates to where one exists
//! - Scan errors are soft: they are logged, counted, and traversal continues

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the disk-walker application
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Scan errors (directory open, entry stat)
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Report rendering errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while scanning a single directory
#[derive(Error, Debug)]
pub enum ScanError {
    /// The OS refused or failed the directory open; the subtree is lost
    #[error("Failed to open directory '{path}': {source}")]
    OpenDir {
        path: String,
        source: std::io::Error,
    },

    /// A per-entry stat failed; the entry is dropped, the scan continues
    #[error("Failed to stat '{path}': {source}")]
    Stat {
        path: String,
        source: std::io::Error,
    },
}

impl ScanError {
    /// The path the error relates to
    pub fn path(&self) -> &str {
        match self {
            ScanError::OpenDir { path, .. } => path,
            ScanError::Stat { path, .. } => path,
        }
    }

    /// True if the error loses a whole subtree rather than a single entry
    pub fn loses_subtree(&self) -> bool {
        matches!(self, ScanError::OpenDir { .. })
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// The traversal root cannot be opened as a directory
    #[error("Cannot read root directory '{path}': {reason}")]
    RootNotReadable { path: String, reason: String },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },
}

/// Report rendering errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// The output file could not be opened for writing
    #[error("Failed to open '{path}' for writing: {source}")]
    OutputOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the report body failed
    #[error("Failed to write report: {source}")]
    Write { source: std::io::Error },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked")]
    Panicked { id: usize },

    /// Worker initialization failed
    #[error("Failed to spawn worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for ScanError
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Represents the outcome of scanning a single directory
#[derive(Debug)]
pub enum ScanOutcome {
    /// Successfully scanned the directory
    Success {
        path: String,
        files: usize,
        subdirs: usize,
    },

    /// Failed with error
    Failed { path: String, error: ScanError },
}

impl ScanOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success { .. })
    }

    /// Returns the path associated with this outcome
    pub fn path(&self) -> &str {
        match self {
            ScanOutcome::Success { path, .. } => path,
            ScanOutcome::Failed { path, .. } => path,
        }
    }
}
