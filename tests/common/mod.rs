//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Create a small project directory inside `temp_dir`.
///
/// ```text
/// <temp_dir>/project/
///   notes.txt
///   .cache/
///     blob
///   raw/
///     a.html
///     b.html
///   text/
///     nested/
///       c.txt
/// ```
///
/// Returns the path to the project directory.
#[allow(dead_code)]
pub fn create_test_tree(temp_dir: &TempDir) -> PathBuf {
    let root = temp_dir.path().join("project");
    std::fs::create_dir_all(root.join(".cache")).unwrap();
    std::fs::create_dir_all(root.join("raw")).unwrap();
    std::fs::create_dir_all(root.join("text/nested")).unwrap();

    std::fs::write(root.join("notes.txt"), "notes").unwrap();
    std::fs::write(root.join(".cache/blob"), "blob").unwrap();
    std::fs::write(root.join("raw/a.html"), "<p>a</p>").unwrap();
    std::fs::write(root.join("raw/b.html"), "<p>b</p>").unwrap();
    std::fs::write(root.join("text/nested/c.txt"), "c").unwrap();

    root
}
