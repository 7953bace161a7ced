//! Directory scanner
//!
//! Enumerates a single directory's entries, probes each one, and returns a
//! [`DirRecord`] with the local file totals and the discovered sub-directory
//! paths. Sub-directory size contributions arrive later, applied by the
//! coordinator as descendants complete.

use crate::error::ScanError;
use crate::probe::{probe, FileRecord};
use std::collections::HashMap;
use std::fs;
use tracing::warn;

/// Per-directory aggregate produced by one scan.
///
/// `file_total_size` and `num_files` are set once by the scanner;
/// `sub_dir_total_size` and `total_size` grow as descendants complete.
#[derive(Debug, Clone, Default)]
pub struct DirRecord {
    /// Absolute path of this directory
    pub path: String,

    /// Parent directory path; empty iff this is the traversal root
    pub parent_path: String,

    /// Probed file entries, in whatever order the OS returned them
    pub files: Vec<FileRecord>,

    /// Absolute paths of immediate sub-directories (pre-skip filter excluded)
    pub sub_dirs: Vec<String>,

    /// Sum of `files[i].size`
    pub file_total_size: u64,

    /// Sum of completed descendant totals, applied by the coordinator
    pub sub_dir_total_size: u64,

    /// `file_total_size + sub_dir_total_size`
    pub total_size: u64,

    /// Number of file entries
    pub num_files: u64,
}

impl DirRecord {
    /// Average file size in bytes, 0 when the directory has no files.
    pub fn average_file_size(&self) -> f64 {
        if self.num_files == 0 {
            return 0.0;
        }
        self.file_total_size as f64 / self.num_files as f64
    }

    /// Average size of the discovered sub-directories, 0 when there are none.
    pub fn average_directory_size(&self) -> f64 {
        if self.sub_dirs.is_empty() {
            return 0.0;
        }
        self.sub_dir_total_size as f64 / self.sub_dirs.len() as f64
    }

    /// The most frequent non-empty extension among this directory's files.
    /// Ties break toward the extension seen first; empty if no file has one.
    pub fn top_extension(&self) -> &str {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (idx, file) in self.files.iter().enumerate() {
            if file.extension.is_empty() {
                continue;
            }
            counts
                .entry(file.extension.as_str())
                .or_insert((0, idx))
                .0 += 1;
        }
        counts
            .into_iter()
            .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
                count_a.cmp(count_b).then(first_b.cmp(first_a))
            })
            .map(|(ext, _)| ext)
            .unwrap_or("")
    }
}

/// Join a directory path and an entry name, special-casing the filesystem
/// root so no double separator is produced.
pub fn join_path(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// True if `path` contains any of the configured skip substrings.
///
/// The match is substring containment, not a strict prefix: a skip entry of
/// `/mnt/` also matches `/x/mnt//y`. This mirrors how operators configure
/// bind-mount exclusions.
pub fn should_skip(path: &str, skip_dirs: &[String]) -> bool {
    skip_dirs.iter().any(|skip| path.contains(skip.as_str()))
}

/// Scan one directory: enumerate entries, probe and classify each, and
/// accumulate the local file totals.
///
/// Probe failures drop the entry and continue; symbolic links are skipped;
/// sub-directories matching a skip substring are excluded from discovery.
/// On return `total_size` equals `file_total_size` - descendant
/// contributions are merged in afterwards by the coordinator.
pub fn scan(path: &str, parent_path: &str, skip_dirs: &[String]) -> Result<DirRecord, ScanError> {
    let entries = fs::read_dir(path).map_err(|source| ScanError::OpenDir {
        path: path.to_string(),
        source,
    })?;

    let mut record = DirRecord {
        path: path.to_string(),
        parent_path: parent_path.to_string(),
        ..DirRecord::default()
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                warn!(path = %path, error = %source, "Failed to read directory entry");
                continue;
            }
        };

        let name = entry.file_name();
        let full_path = join_path(path, &name.to_string_lossy());

        let file = match probe(&full_path) {
            Ok(file) => file,
            Err(error) => {
                warn!(path = %full_path, error = %error, "Failed to stat entry");
                continue;
            }
        };

        if file.kind.is_symlink() {
            continue;
        }

        if file.kind.is_dir() {
            if should_skip(&full_path, skip_dirs) {
                continue;
            }
            record.sub_dirs.push(full_path);
        } else {
            record.file_total_size += file.size;
            record.num_files += 1;
            record.files.push(file);
        }
    }

    record.total_size = record.file_total_size;
    Ok(record)
}
