//! Source-tree scanning for architecture contract tests.

use std::fs;
use std::path::{Path, PathBuf};

/// A hit: crate-relative path, 1-based line number, raw line.
pub type Hit = (String, usize, String);

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn relative_path(path: &Path) -> String {
    path.strip_prefix(root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("failed to read dir {}: {e}", dir.display()));

    for entry in entries {
        let path = entry
            .unwrap_or_else(|e| panic!("failed to read dir entry: {e}"))
            .path();
        if path.is_dir() {
            walk(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
}

/// Every `.rs` file under `relative_dir` with its contents, sorted by path.
fn sources(relative_dir: &str) -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    walk(&root().join(relative_dir), &mut files);
    files.sort();
    files
        .into_iter()
        .map(|file| {
            let content = fs::read_to_string(&file)
                .unwrap_or_else(|e| panic!("failed to read {}: {e}", file.display()));
            (file, content)
        })
        .collect()
}

/// Lines outside `#[cfg(test)]` modules that contain any of `patterns`.
///
/// Test modules are skipped from the first `#[cfg(test)]` to end of file,
/// matching the convention that tests sit at the bottom.
pub fn find_lines_containing(relative_dir: &str, patterns: &[&str]) -> Vec<Hit> {
    let mut hits = Vec::new();
    for (file, content) in sources(relative_dir) {
        for (idx, line) in content.lines().enumerate() {
            if line.trim_start().starts_with("#[cfg(test)]") {
                break;
            }
            if line.trim_start().starts_with("//") {
                continue;
            }
            if patterns.iter().any(|p| line.contains(p)) {
                hits.push((relative_path(&file), idx + 1, line.to_string()));
            }
        }
    }
    hits
}

pub fn find_lines_containing_except_files(
    relative_dir: &str,
    patterns: &[&str],
    allowed_relative_files: &[&str],
) -> Vec<Hit> {
    find_lines_containing(relative_dir, patterns)
        .into_iter()
        .filter(|(path, _, _)| !allowed_relative_files.contains(&path.as_str()))
        .collect()
}

pub fn path_exists(relative_path: &str) -> bool {
    root().join(relative_path).exists()
}

/// Lines in `mod.rs` files other than comments, attributes and `mod` items.
pub fn find_non_export_lines_in_mod_files(relative_dir: &str) -> Vec<Hit> {
    let mut violations = Vec::new();
    for (file, content) in sources(relative_dir) {
        if file.file_name().and_then(|s| s.to_str()) != Some("mod.rs") {
            continue;
        }
        for (idx, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            let allowed = line.is_empty()
                || line.starts_with("//")
                || line.starts_with("pub mod ")
                || line.starts_with("mod ")
                || line.starts_with("#[cfg");
            if !allowed {
                violations.push((relative_path(&file), idx + 1, raw_line.to_string()));
            }
        }
    }
    violations
}
