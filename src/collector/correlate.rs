//! Descriptor/socket correlation.
//!
//! Enumerates a process's open descriptors, resolves the socket-backed
//! ones to inodes and joins them against loaded socket tables by exact
//! inode equality. The join is a linear scan per descriptor against each
//! table, `O(F × S)`, which is fine at diagnostic poll rates.

use crate::collector::net::{SocketRecord, SocketTable};
use crate::collector::traits::FileSystem;
use std::io;
use std::path::Path;
use tracing::debug;

/// Resolved target of one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FdTarget {
    /// Link text matched `socket:[N]`.
    Socket(u64),
    /// Anything else a descriptor can point at.
    Path(String),
}

/// Transient pairing of a descriptor number with its resolved target;
/// lives only for the duration of one correlation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdEntry {
    pub fd: u32,
    pub target: FdTarget,
}

/// Error type for a correlation pass that could not list descriptors.
///
/// Only the connection report section is lost; the rest of the tick is
/// unaffected.
#[derive(Debug)]
pub struct CorrelateError {
    pub pid: u32,
    pub source: io::Error,
}

impl std::fmt::Display for CorrelateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to list descriptors of pid {}: {}",
            self.pid, self.source
        )
    }
}

impl std::error::Error for CorrelateError {}

/// Correlates a process's descriptors with socket table records.
pub struct SocketCorrelator<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> SocketCorrelator<F> {
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Lists `<proc>/[pid]/fd` and resolves every descriptor link.
    ///
    /// Entries are returned in ascending descriptor order. Descriptors
    /// that vanish between the listing and the link read are skipped.
    pub fn fd_entries(&self, pid: u32) -> Result<Vec<FdEntry>, CorrelateError> {
        let fd_dir = format!("{}/{}/fd", self.proc_path, pid);
        let listing = self
            .fs
            .read_dir(Path::new(&fd_dir))
            .map_err(|source| CorrelateError { pid, source })?;

        let mut entries = Vec::with_capacity(listing.len());
        for path in listing {
            let Some(fd) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<u32>().ok())
            else {
                continue;
            };

            let target = match self.fs.read_link(&path) {
                Ok(target) => target,
                Err(e) => {
                    debug!("fd {} of pid {} vanished: {}", fd, pid, e);
                    continue;
                }
            };

            let target = target.to_string_lossy().into_owned();
            let target = match parse_socket_inode(&target) {
                Some(inode) => FdTarget::Socket(inode),
                None => FdTarget::Path(target),
            };
            entries.push(FdEntry { fd, target });
        }

        entries.sort_by_key(|e| e.fd);
        Ok(entries)
    }

    /// Joins resolved descriptors against every loaded table.
    ///
    /// Emits every record whose inode matches a held socket descriptor,
    /// ordered by descriptor enumeration and then table order. The
    /// kernel may reuse an inode across tables, and all matches are
    /// reported rather than assumed unique.
    pub fn matches<'t>(
        &self,
        entries: &[FdEntry],
        tables: &'t [SocketTable],
    ) -> Vec<&'t SocketRecord> {
        let mut found = Vec::new();
        for entry in entries {
            let FdTarget::Socket(inode) = entry.target else {
                continue;
            };
            if inode == 0 {
                continue;
            }
            for table in tables {
                found.extend(table.lookup(inode));
            }
        }
        found
    }

    /// Convenience wrapper: enumerate and join in one pass.
    pub fn correlate<'t>(
        &self,
        pid: u32,
        tables: &'t [SocketTable],
    ) -> Result<Vec<&'t SocketRecord>, CorrelateError> {
        let entries = self.fd_entries(pid)?;
        Ok(self.matches(&entries, tables))
    }
}

/// Extracts N from `socket:[N]` link text.
fn parse_socket_inode(target: &str) -> Option<u64> {
    target
        .strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}
