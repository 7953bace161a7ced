//! Report rendering
//!
//! Every renderer is a pure function over the completed map: it follows
//! `sub_dirs` links, never the filesystem, and silently omits children whose
//! scan failed. Rendering the same request against the same map twice yields
//! byte-identical output.

use crate::config::{ReportKind, ReportRequest};
use crate::error::ReportError;
use crate::scanner::DirRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Separator row printed above each info block
const INFO_SEPARATOR: &str =
    "________________________________________________________________________________";

/// Renders reports over a completed traversal
pub struct ReportGenerator<'a> {
    completed: &'a HashMap<String, DirRecord>,
    root: &'a str,
}

impl<'a> ReportGenerator<'a> {
    /// Create a generator over the completed map rooted at `root`
    pub fn new(completed: &'a HashMap<String, DirRecord>, root: &'a str) -> Self {
        Self { completed, root }
    }

    /// Run one report request against stdout or the output file
    pub fn run(&self, request: &ReportRequest, output_path: &Path) -> Result<(), ReportError> {
        if request.to_file {
            let file = File::create(output_path).map_err(|source| ReportError::OutputOpen {
                path: output_path.to_path_buf(),
                source,
            })?;
            let mut out = BufWriter::new(file);
            self.render(request, &mut out)
                .and_then(|()| out.flush())
                .map_err(|source| ReportError::Write { source })
        } else {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            self.render(request, &mut out)
                .map_err(|source| ReportError::Write { source })
        }
    }

    /// Render one report request to an arbitrary writer
    pub fn render(&self, request: &ReportRequest, out: &mut dyn Write) -> io::Result<()> {
        match request.kind {
            ReportKind::Tree => self.render_tree(out, request.max_depth),
            ReportKind::Paths => self.render_paths(out, false),
            ReportKind::SortedPaths => self.render_paths(out, true),
            ReportKind::Info => self.render_info(out, request.max_depth),
        }
    }

    fn render_tree(&self, out: &mut dyn Write, max_depth: Option<usize>) -> io::Result<()> {
        match self.completed.get(self.root) {
            Some(root) => self.tree_node(out, root, "", true, true, 0, max_depth),
            None => Ok(()),
        }
    }

    /// Recursive tree printer. Sub-directories come first (by full path),
    /// then files (by name); the last line at a level uses the closing
    /// branch symbol, so a directory is "last" only when no files follow it.
    #[allow(clippy::too_many_arguments)]
    fn tree_node(
        &self,
        out: &mut dyn Write,
        dir: &DirRecord,
        prefix: &str,
        is_last: bool,
        is_root: bool,
        depth: usize,
        max_depth: Option<usize>,
    ) -> io::Result<()> {
        let child_prefix = if is_root {
            writeln!(out, "{}", dir.path)?;
            prefix.to_string()
        } else {
            writeln!(
                out,
                "{}{}{}",
                prefix,
                if is_last { "└─ " } else { "├─ " },
                dir.path
            )?;
            format!("{}{}", prefix, if is_last { "   " } else { "│  " })
        };

        if max_depth.is_some_and(|limit| depth >= limit) {
            return Ok(());
        }

        for (i, sub_path) in dir.sub_dirs.iter().enumerate() {
            if let Some(child) = self.completed.get(sub_path) {
                let last = i == dir.sub_dirs.len() - 1 && dir.files.is_empty();
                self.tree_node(out, child, &child_prefix, last, false, depth + 1, max_depth)?;
            }
        }

        for (i, file) in dir.files.iter().enumerate() {
            writeln!(
                out,
                "{}{}{}",
                child_prefix,
                if i == dir.files.len() - 1 { "└─ " } else { "├─ " },
                file.name
            )?;
        }

        Ok(())
    }

    fn render_paths(&self, out: &mut dyn Write, sorted: bool) -> io::Result<()> {
        if sorted {
            let mut paths: Vec<&str> = self.completed.keys().map(String::as_str).collect();
            paths.sort_unstable();
            for path in paths {
                writeln!(out, "{path}")?;
            }
        } else {
            for path in self.completed.keys() {
                writeln!(out, "{path}")?;
            }
        }
        Ok(())
    }

    /// Unlimited info dumps every completed directory in map order; the
    /// depth-limited variant walks from the root so the level count is
    /// well-defined.
    fn render_info(&self, out: &mut dyn Write, max_depth: Option<usize>) -> io::Result<()> {
        match max_depth {
            None => {
                for dir in self.completed.values() {
                    info_block(out, dir)?;
                }
                Ok(())
            }
            Some(limit) => {
                let mut stack: Vec<(&str, usize)> = vec![(self.root, 0)];
                while let Some((path, depth)) = stack.pop() {
                    let Some(dir) = self.completed.get(path) else {
                        continue;
                    };
                    info_block(out, dir)?;
                    if depth < limit {
                        for sub_path in dir.sub_dirs.iter().rev() {
                            stack.push((sub_path, depth + 1));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

fn info_block(out: &mut dyn Write, dir: &DirRecord) -> io::Result<()> {
    writeln!(out, "{INFO_SEPARATOR}")?;
    writeln!(out, "{}", dir.path)?;
    writeln!(out, "Directories: {}", dir.sub_dirs.len())?;
    writeln!(out, "Total size: {}", dir.total_size)?;
    writeln!(out, "Average sub-directory size: {}", dir.average_directory_size())?;
    writeln!(out, "Files: {}", dir.num_files)?;
    writeln!(out, "Average file size: {}", dir.average_file_size())?;
    writeln!(out, "Most common extension: {}", dir.top_extension())?;
    writeln!(out)
}
