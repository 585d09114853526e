//! Target process identity preconditions.
//!
//! Process identity is a precondition, not a transient state: if the pid
//! is gone or belongs to a different executable, every later read would
//! describe the wrong process, so these failures terminate the program.

use crate::collector::traits::FileSystem;
use std::io;
use std::path::Path;

/// Error type for identity precondition failures. All variants are
/// fatal to the program.
#[derive(Debug)]
pub enum IdentityError {
    /// `<proc>/[pid]` does not exist.
    NotFound(u32),
    /// The `exe` link could not be read (no permission, or the process
    /// exited between checks).
    Inaccessible { pid: u32, source: io::Error },
    /// The resolved executable differs from the expected absolute path.
    ExeMismatch {
        pid: u32,
        expected: String,
        actual: String,
    },
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityError::NotFound(pid) => write!(f, "PID {} is not accessible", pid),
            IdentityError::Inaccessible { pid, source } => {
                write!(f, "PID {} is not accessible: {}", pid, source)
            }
            IdentityError::ExeMismatch { pid, expected, actual } => write!(
                f,
                "PID {} does not match the executable name {} (resolved {})",
                pid, expected, actual
            ),
        }
    }
}

impl std::error::Error for IdentityError {}

/// Verifies pid liveness and executable identity.
pub struct ProcessIdentity<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> ProcessIdentity<F> {
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Checks that the pid exists and that its `exe` link resolves to
    /// exactly `expected_exe`.
    pub fn verify(&self, pid: u32, expected_exe: &str) -> Result<(), IdentityError> {
        let proc_dir = format!("{}/{}", self.proc_path, pid);
        if !self.fs.exists(Path::new(&proc_dir)) {
            return Err(IdentityError::NotFound(pid));
        }

        let exe_link = format!("{}/exe", proc_dir);
        let actual = self
            .fs
            .read_link(Path::new(&exe_link))
            .map_err(|source| IdentityError::Inaccessible { pid, source })?;

        let actual = actual.to_string_lossy().into_owned();
        if actual != expected_exe {
            return Err(IdentityError::ExeMismatch {
                pid,
                expected: expected_exe.to_string(),
                actual,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_verify_matching_exe() {
        let fs = MockFs::typical_target();
        let identity = ProcessIdentity::new(fs, "/proc");
        assert!(identity.verify(4242, "/usr/bin/leaky").is_ok());
    }

    #[test]
    fn test_verify_unknown_pid() {
        let identity = ProcessIdentity::new(MockFs::typical_target(), "/proc");
        assert!(matches!(
            identity.verify(31337, "/usr/bin/leaky"),
            Err(IdentityError::NotFound(31337))
        ));
    }

    #[test]
    fn test_verify_exe_mismatch() {
        let identity = ProcessIdentity::new(MockFs::typical_target(), "/proc");
        let err = identity.verify(4242, "/usr/bin/other").unwrap_err();
        assert!(matches!(err, IdentityError::ExeMismatch { .. }));
    }

    #[test]
    fn test_verify_unreadable_exe_link() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/77/stat", "77 (x) S 1 77 77 0 -1");
        let identity = ProcessIdentity::new(fs, "/proc");
        assert!(matches!(
            identity.verify(77, "/usr/bin/x"),
            Err(IdentityError::Inaccessible { pid: 77, .. })
        ));
    }
}
