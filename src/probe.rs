//! Entry probe
//!
//! Maps a single path to a [`FileRecord`] using a non-following stat, so
//! symbolic links are identified as such and can be skipped by the caller.
//! Regular files are never opened; everything comes from the metadata.

use crate::error::ScanError;
use std::fmt;
use std::fs;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::fs::PermissionsExt;

/// File type as reported by the (non-following) stat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Regular,
    Directory,
    Symlink,
    Block,
    Char,
    Fifo,
    Socket,
    Unknown,
}

impl EntryKind {
    fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_file() {
            EntryKind::Regular
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_block_device() {
            EntryKind::Block
        } else if file_type.is_char_device() {
            EntryKind::Char
        } else if file_type.is_fifo() {
            EntryKind::Fifo
        } else if file_type.is_socket() {
            EntryKind::Socket
        } else {
            EntryKind::Unknown
        }
    }

    /// Returns true for directories
    pub fn is_dir(self) -> bool {
        self == EntryKind::Directory
    }

    /// Returns true for symbolic links
    pub fn is_symlink(self) -> bool {
        self == EntryKind::Symlink
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Regular => "Regular File",
            EntryKind::Directory => "Directory",
            EntryKind::Symlink => "Symbolic Link",
            EntryKind::Block => "Block Device",
            EntryKind::Char => "Character Device",
            EntryKind::Fifo => "FIFO",
            EntryKind::Socket => "Socket",
            EntryKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Metadata for a single probed entry. Immutable once the probe returns.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path of the entry
    pub path: String,

    /// Path of the containing directory (empty if the path has no separator)
    pub parent_path: String,

    /// Entry name, the substring after the final separator
    pub name: String,

    /// Substring after the final `.` in the name, empty if none
    pub extension: String,

    /// File type from the stat's mode field
    pub kind: EntryKind,

    /// Nine-character ugo/rwx permission string
    pub permissions: String,

    /// Size in bytes as reported by the stat
    pub size: u64,
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        writeln!(f, "\tPath: {}", self.path)?;
        writeln!(f, "\tParent Path: {}", self.parent_path)?;
        writeln!(f, "\tType: {}", self.kind)?;
        writeln!(f, "\tExtension: {}", self.extension)?;
        writeln!(f, "\tPermissions: {}", self.permissions)?;
        writeln!(f, "\tSize: {} bytes", self.size)
    }
}

/// Probe a single path without following symbolic links.
pub fn probe(path: &str) -> Result<FileRecord, ScanError> {
    let metadata = fs::symlink_metadata(path).map_err(|source| ScanError::Stat {
        path: path.to_string(),
        source,
    })?;

    let (parent_path, name) = split_path(path);
    let extension = extension_of(&name);

    Ok(FileRecord {
        path: path.to_string(),
        parent_path,
        name,
        extension,
        kind: EntryKind::from_file_type(metadata.file_type()),
        permissions: permission_string(metadata.permissions().mode()),
        size: metadata.len(),
    })
}

/// Split a path into (parent, name) at the final separator.
fn split_path(path: &str) -> (String, String) {
    match path.rfind('/') {
        Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
        None => (String::new(), path.to_string()),
    }
}

/// Extension is everything after the final `.` in the name.
fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_string(),
        None => String::new(),
    }
}

/// Render mode bits as the classic nine-character ugo/rwx string.
fn permission_string(mode: u32) -> String {
    let mut perms = String::with_capacity(9);
    perms.push(if mode & 0o400 != 0 { 'r' } else { '-' });
    perms.push(if mode & 0o200 != 0 { 'w' } else { '-' });
    perms.push(if mode & 0o100 != 0 { 'x' } else { '-' });
    perms.push(if mode & 0o040 != 0 { 'r' } else { '-' });
    perms.push(if mode & 0o020 != 0 { 'w' } else { '-' });
    perms.push(if mode & 0o010 != 0 { 'x' } else { '-' });
    perms.push(if mode & 0o004 != 0 { 'r' } else { '-' });
    perms.push(if mode & 0o002 != 0 { 'w' } else { '-' });
    perms.push(if mode & 0o001 != 0 { 'x' } else { '-' });
    perms
}
