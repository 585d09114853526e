//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files, directories and symbolic links in memory, allowing tests
/// to simulate various `/proc` filesystem states without actual Linux
/// access. Symlinks are never followed; `read_link` returns the stored
/// target verbatim, mirroring how fd links behave under real `/proc`.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Map from path to symlink target.
    symlinks: HashMap<PathBuf, PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a symbolic link pointing at `target`.
    ///
    /// The target does not have to exist; `socket:[N]` pseudo-targets are
    /// the common case.
    pub fn add_symlink(&mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.symlinks
            .insert(path, target.as_ref().to_path_buf());
    }

    /// Removes a file, directory or symlink, keeping the rest of the tree.
    pub fn remove(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.remove(path);
        self.directories.remove(path);
        self.symlinks.remove(path);
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.symlinks.contains_key(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for link_path in self.symlinks.keys() {
            if link_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(link_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.symlinks.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("symlink not found: {:?}", path),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 16384 kB\n");

        assert!(fs.exists(Path::new("/proc/meminfo")));
        assert!(fs.exists(Path::new("/proc")));

        let content = fs.read_to_string(Path::new("/proc/meminfo")).unwrap();
        assert_eq!(content, "MemTotal: 16384 kB\n");
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/1/stat", "stat content");
        fs.add_file("/proc/1/status", "status content");
        fs.add_file("/proc/2/stat", "stat content 2");

        let proc_entries = fs.read_dir(Path::new("/proc")).unwrap();
        assert_eq!(proc_entries.len(), 2); // /proc/1 and /proc/2

        let proc1_entries = fs.read_dir(Path::new("/proc/1")).unwrap();
        assert_eq!(proc1_entries.len(), 2); // stat and status
    }

    #[test]
    fn test_mock_fs_symlinks() {
        let mut fs = MockFs::new();
        fs.add_symlink("/proc/42/fd/3", "socket:[12345]");
        fs.add_symlink("/proc/42/exe", "/usr/bin/leaky");

        assert!(fs.exists(Path::new("/proc/42/fd/3")));

        let target = fs.read_link(Path::new("/proc/42/fd/3")).unwrap();
        assert_eq!(target, PathBuf::from("socket:[12345]"));

        // symlinks show up in directory listings
        let fd_entries = fs.read_dir(Path::new("/proc/42/fd")).unwrap();
        assert_eq!(fd_entries.len(), 1);

        // read_link on a regular file is an error
        fs.add_file("/proc/42/stat", "x");
        assert!(fs.read_link(Path::new("/proc/42/stat")).is_err());
    }

    #[test]
    fn test_mock_fs_remove() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/net/tcp6", "header\n");
        assert!(fs.exists(Path::new("/proc/net/tcp6")));

        fs.remove("/proc/net/tcp6");
        assert!(!fs.exists(Path::new("/proc/net/tcp6")));
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        assert!(fs.read_to_string(Path::new("/nope")).is_err());
        assert!(fs.read_dir(Path::new("/nope")).is_err());
        assert!(fs.read_link(Path::new("/nope")).is_err());
        assert!(!fs.exists(Path::new("/nope")));
    }
}
