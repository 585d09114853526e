//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the collectors to work with both the real
//! `/proc` filesystem on Linux and mock implementations in tests.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for the filesystem operations the collectors need.
///
/// Every read acquires the underlying handle, drains it completely and
/// releases it before returning, so no collector ever holds a file open
/// across a poll tick.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    ///
    /// Entry order is unspecified; callers that need determinism sort.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Reads the target of a symbolic link without resolving it.
    ///
    /// Targets of `/proc/[pid]/fd` links are frequently not real paths
    /// (`socket:[12345]`), so the raw link text is returned verbatim.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_real_fs_read_to_string() {
        let fs = RealFs::new();
        let cargo_toml = env::current_dir().unwrap().join("Cargo.toml");
        let content = fs.read_to_string(&cargo_toml).unwrap();
        assert!(content.contains("[package]"));
    }

    #[test]
    fn test_real_fs_exists() {
        let fs = RealFs::new();
        let cargo_toml = env::current_dir().unwrap().join("Cargo.toml");
        assert!(fs.exists(&cargo_toml));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_real_fs_read_dir() {
        let fs = RealFs::new();
        let src_dir = env::current_dir().unwrap().join("src");
        let entries = fs.read_dir(&src_dir).unwrap();
        assert!(!entries.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_read_link_raw_target() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("3");
        // fd-style links point at pseudo-paths that do not exist on disk
        std::os::unix::fs::symlink("socket:[98765]", &link).unwrap();

        let fs = RealFs::new();
        let target = fs.read_link(&link).unwrap();
        assert_eq!(target, PathBuf::from("socket:[98765]"));
    }
}
