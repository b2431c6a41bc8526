//! Test harness helpers.

use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};
use tracing_subscriber::EnvFilter;

/// Create a temporary directory for testing.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
pub fn test_dir() -> TempDir {
    TempDir::with_prefix("mdconf-").expect("Failed to create temp directory")
}

/// Create a temporary `.conf` file with the given content.
///
/// # Panics
///
/// Panics if the file cannot be created or written.
#[must_use]
pub fn test_file(content: &str) -> NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(".conf")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

/// Create a file within a temporary directory and return its path.
///
/// # Panics
///
/// Panics if the file cannot be created or written.
#[must_use]
pub fn test_file_in_dir(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(&path, content).expect("Failed to write file");
    path
}

/// Set up test logging with the given filter.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// A temporary server root holding configuration files and a state dir.
#[derive(Debug)]
pub struct TestContext {
    /// Temporary directory for the test.
    pub dir: TempDir,
}

impl TestContext {
    /// Create a new test context.
    #[must_use]
    pub fn new() -> Self {
        Self { dir: test_dir() }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file in the test directory.
    #[must_use]
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        test_file_in_dir(&self.dir, name, content)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_file_has_conf_suffix() {
        let file = test_file("MDMustStaple on\n");
        assert!(file.path().to_string_lossy().ends_with(".conf"));
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "MDMustStaple on\n");
    }

    #[test]
    fn test_context_creates_nested_files() {
        let ctx = TestContext::new();
        let path = ctx.create_file("conf.d/md.conf", "MDomain example.org\n");
        assert!(path.exists());
        assert!(path.starts_with(ctx.path()));
    }

    #[test]
    fn test_logging_can_be_set_up_twice() {
        setup_test_logging("debug");
        setup_test_logging("warn");
    }
}
