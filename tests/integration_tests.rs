//! Integration tests for disk-walker
//!
//! Each test builds a real directory tree under a tempdir, runs the full
//! traversal, and checks the completed map against the aggregate-size
//! invariants and the report output.

use disk_walker::config::{ReportKind, ReportRequest, WalkConfig};
use disk_walker::report::ReportGenerator;
use disk_walker::scanner::DirRecord;
use disk_walker::walker::WalkCoordinator;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, bytes: usize) {
    let mut file = File::create(path).unwrap();
    file.write_all(&vec![b'x'; bytes]).unwrap();
}

fn test_config(root: &Path, workers: usize, skip_dirs: Vec<String>) -> WalkConfig {
    WalkConfig {
        root: root.to_string_lossy().into_owned(),
        output_path: root.join("out.txt"),
        worker_count: workers,
        skip_dirs,
        show_progress: false,
        verbose: false,
        reports: vec![],
        unknown_flags: vec![],
    }
}

fn walk(root: &Path, workers: usize, skip_dirs: Vec<String>) -> HashMap<String, DirRecord> {
    let coordinator = WalkCoordinator::new(test_config(root, workers, skip_dirs)).unwrap();
    coordinator.run().completed
}

/// Every completed directory's total must equal its own files plus the
/// totals of its completed children.
fn assert_totals_consistent(completed: &HashMap<String, DirRecord>) {
    for (path, dir) in completed {
        let child_sum: u64 = dir
            .sub_dirs
            .iter()
            .filter_map(|sub| completed.get(sub))
            .map(|child| child.total_size)
            .sum();
        assert_eq!(
            dir.total_size,
            dir.file_total_size + child_sum,
            "inconsistent total for {path}"
        );
        assert_eq!(dir.sub_dir_total_size, child_sum, "inconsistent subdir total for {path}");
        assert_eq!(dir.num_files as usize, dir.files.len(), "file count mismatch for {path}");
        let file_sum: u64 = dir.files.iter().map(|f| f.size).sum();
        assert_eq!(dir.file_total_size, file_sum, "file size sum mismatch for {path}");
    }
}

#[test]
fn test_empty_directory() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("a");
    fs::create_dir(&root).unwrap();

    let completed = walk(&root, 4, vec![]);
    assert_eq!(completed.len(), 1);

    let record = &completed[root.to_str().unwrap()];
    assert!(record.files.is_empty());
    assert!(record.sub_dirs.is_empty());
    assert_eq!(record.file_total_size, 0);
    assert_eq!(record.total_size, 0);
    assert_eq!(record.num_files, 0);
    assert_eq!(record.parent_path, "");
}

#[test]
fn test_flat_directory_with_two_files() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("b");
    fs::create_dir(&root).unwrap();
    write_file(&root.join("f1"), 100);
    write_file(&root.join("f2.txt"), 50);

    let completed = walk(&root, 4, vec![]);
    let record = &completed[root.to_str().unwrap()];
    assert_eq!(record.num_files, 2);
    assert_eq!(record.file_total_size, 150);
    assert_eq!(record.total_size, 150);
    assert_eq!(record.top_extension(), "txt");
}

#[test]
fn test_two_level_tree() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("c");
    fs::create_dir(&root).unwrap();
    write_file(&root.join("x.log"), 10);
    fs::create_dir(root.join("s")).unwrap();
    write_file(&root.join("s/y.log"), 20);
    write_file(&root.join("s/z.txt"), 5);

    let completed = walk(&root, 4, vec![]);
    assert_eq!(completed.len(), 2);

    let sub = &completed[root.join("s").to_str().unwrap()];
    assert_eq!(sub.total_size, 25);
    assert_eq!(sub.parent_path, root.to_str().unwrap());

    let record = &completed[root.to_str().unwrap()];
    assert_eq!(record.file_total_size, 10);
    assert_eq!(record.sub_dir_total_size, 25);
    assert_eq!(record.total_size, 35);

    assert_totals_consistent(&completed);
}

#[test]
fn test_deep_chain_credits_every_ancestor() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("d");
    let leaf = root.join("a/b/c");
    fs::create_dir_all(&leaf).unwrap();
    write_file(&leaf.join("payload"), 7);

    // Default worker count; the chain serializes through the frontier in
    // some order, the totals must not care.
    let completed = walk(&root, 200, vec![]);
    assert_eq!(completed.len(), 4);

    for path in [
        root.to_str().unwrap().to_string(),
        root.join("a").to_string_lossy().into_owned(),
        root.join("a/b").to_string_lossy().into_owned(),
        root.join("a/b/c").to_string_lossy().into_owned(),
    ] {
        assert_eq!(completed[&path].total_size, 7, "wrong total for {path}");
    }

    assert_totals_consistent(&completed);
}

#[test]
fn test_wide_tree_totals_are_order_independent() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_path_buf();

    let mut expected_total = 0u64;
    for i in 0..8 {
        let branch = root.join(format!("branch{i}"));
        fs::create_dir(&branch).unwrap();
        for j in 0..4 {
            let nested = branch.join(format!("nested{j}"));
            fs::create_dir(&nested).unwrap();
            write_file(&nested.join("data.bin"), 10 * (j + 1));
            expected_total += 10 * (j + 1) as u64;
        }
    }

    // Run several times with different pool sizes; every interleaving must
    // produce identical totals.
    for workers in [1, 4, 32] {
        let completed = walk(&root, workers, vec![]);
        assert_eq!(completed.len(), 1 + 8 + 8 * 4);
        assert_eq!(
            completed[root.to_str().unwrap()].total_size,
            expected_total
        );
        assert_totals_consistent(&completed);
    }
}

#[test]
fn test_skip_substring_excludes_subtree() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_path_buf();
    fs::create_dir_all(root.join("mounts/foo")).unwrap();
    write_file(&root.join("mounts/foo/data"), 100);
    fs::create_dir(root.join("etc")).unwrap();
    write_file(&root.join("etc/config"), 10);

    let completed = walk(&root, 4, vec!["/mounts/".to_string()]);

    // `/mounts` itself does not contain the substring, its children do
    assert!(completed.contains_key(root.join("mounts").to_str().unwrap()));
    assert!(!completed.contains_key(root.join("mounts/foo").to_str().unwrap()));
    assert!(completed.contains_key(root.join("etc").to_str().unwrap()));

    // The skipped subtree contributes nothing
    assert_eq!(completed[root.to_str().unwrap()].total_size, 10);

    // A bare directory-name substring skips the directory itself
    let completed = walk(&root, 4, vec!["mounts".to_string()]);
    assert!(!completed.contains_key(root.join("mounts").to_str().unwrap()));
    for path in completed.keys() {
        assert!(!path.contains("mounts"), "skipped path present: {path}");
    }
}

#[test]
fn test_symlinks_are_not_traversed() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_path_buf();
    fs::create_dir(root.join("real")).unwrap();
    write_file(&root.join("real/data"), 42);
    std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();
    std::os::unix::fs::symlink(root.join("real/data"), root.join("shortcut")).unwrap();

    let completed = walk(&root, 4, vec![]);
    assert!(!completed.contains_key(root.join("alias").to_str().unwrap()));

    let record = &completed[root.to_str().unwrap()];
    assert_eq!(record.sub_dirs.len(), 1);
    assert_eq!(record.num_files, 0);
    assert_eq!(record.total_size, 42);
    assert_totals_consistent(&completed);
}

#[test]
fn test_unreadable_subdirectory_loses_only_its_subtree() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let root = dir.path().to_path_buf();
    fs::create_dir(root.join("open")).unwrap();
    write_file(&root.join("open/data"), 5);
    let locked = root.join("locked");
    fs::create_dir(&locked).unwrap();
    write_file(&locked.join("hidden"), 99);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users ignore permission bits; nothing to observe then
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let config = test_config(&root, 4, vec![]);
    let coordinator = WalkCoordinator::new(config).unwrap();
    let result = coordinator.run();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(result.errors, 1);
    assert!(!result.completed.contains_key(locked.to_str().unwrap()));
    assert!(result
        .completed
        .contains_key(root.join("open").to_str().unwrap()));
    // The unreadable subtree's bytes are absent from the root total
    assert_eq!(result.completed[root.to_str().unwrap()].total_size, 5);
}

#[test]
fn test_tree_report_end_to_end() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("c");
    fs::create_dir(&root).unwrap();
    write_file(&root.join("x.log"), 10);
    fs::create_dir(root.join("s")).unwrap();
    write_file(&root.join("s/y.log"), 20);

    let completed = walk(&root, 4, vec![]);
    let root_str = root.to_str().unwrap();
    let generator = ReportGenerator::new(&completed, root_str);

    let request = ReportRequest {
        kind: ReportKind::Tree,
        to_file: false,
        max_depth: None,
    };
    let mut buf = Vec::new();
    generator.render(&request, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], root_str);
    assert_eq!(lines[1], format!("├─ {root_str}/s"));
    assert_eq!(lines[2], "│  └─ y.log");
    assert_eq!(lines[3], "└─ x.log");
}

#[test]
fn test_report_file_output_is_idempotent() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir_all(root.join("s1/s2")).unwrap();
    write_file(&root.join("s1/a.txt"), 3);
    write_file(&root.join("s1/s2/b.txt"), 4);

    let completed = walk(&root, 4, vec![]);
    let root_str = root.to_string_lossy().into_owned();
    let generator = ReportGenerator::new(&completed, &root_str);
    let output = dir.path().join("report.txt");

    for kind in [ReportKind::Tree, ReportKind::SortedPaths, ReportKind::Info] {
        let request = ReportRequest {
            kind,
            to_file: true,
            max_depth: None,
        };
        generator.run(&request, &output).unwrap();
        let first = fs::read_to_string(&output).unwrap();
        generator.run(&request, &output).unwrap();
        let second = fs::read_to_string(&output).unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}

#[test]
fn test_sorted_paths_report_lists_all_directories() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("p");
    fs::create_dir_all(root.join("b")).unwrap();
    fs::create_dir_all(root.join("a/inner")).unwrap();

    let completed = walk(&root, 4, vec![]);
    let root_str = root.to_string_lossy().into_owned();
    let generator = ReportGenerator::new(&completed, &root_str);

    let request = ReportRequest {
        kind: ReportKind::SortedPaths,
        to_file: false,
        max_depth: None,
    };
    let mut buf = Vec::new();
    generator.render(&request, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted, "paths are not sorted");
}

#[test]
fn test_run_with_progress_returns_full_result() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_path_buf();
    for i in 0..20 {
        let sub = root.join(format!("d{i}"));
        fs::create_dir(&sub).unwrap();
        write_file(&sub.join("f"), 1);
    }

    let coordinator = WalkCoordinator::new(test_config(&root, 4, vec![])).unwrap();
    // The callback cadence is timing-dependent; only the result is asserted
    let result = coordinator.run_with_progress(|_| {});

    assert_eq!(result.dirs, 21);
    assert_eq!(result.files, 20);
    assert_eq!(result.bytes, 20);
    assert_eq!(result.errors, 0);
    assert_eq!(result.completed.len(), 21);
}
