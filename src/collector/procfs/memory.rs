//! Memory accounting reads for the target process.
//!
//! Three independent lookups back the per-tick snapshot: the
//! `smaps_rollup` aggregate (RSS/PSS/USS), system `MemTotal` and the
//! process page-table footprint `VmPTE`. OOM score reads are best-effort
//! and advisory.

use crate::collector::procfs::parser::{
    parse_labeled_kb, parse_scalar_i32, parse_smaps_rollup,
};
use crate::collector::traits::FileSystem;
use std::io;
use std::path::Path;

/// Error type for memory accounting failures.
#[derive(Debug)]
pub enum MemoryError {
    /// A backing file could not be read.
    Io {
        what: &'static str,
        source: io::Error,
    },
    /// The file was readable but a required counter was absent.
    Missing { what: &'static str },
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::Io { what, source } => write!(f, "failed to read {}: {}", what, source),
            MemoryError::Missing { what } => write!(f, "{} not found", what),
        }
    }
}

impl std::error::Error for MemoryError {}

/// Aggregate memory usage of one process, in kB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub rss_kb: i64,
    pub pss_kb: i64,
    pub uss_kb: i64,
}

/// Kernel out-of-memory kill priority and its user-set bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OomScore {
    pub score: i32,
    pub adj: i32,
}

/// Per-tick memory snapshot of the target process.
#[derive(Debug, Clone, Copy)]
pub struct MemorySnapshot {
    pub total_kb: i64,
    pub usage: MemoryUsage,
    pub page_tables_kb: i64,
    /// Absent when the OOM files were unreadable (advisory).
    pub oom: Option<OomScore>,
}

/// Integer percentage of system memory a process occupies, truncated.
///
/// Drives the memory-pressure gate; mirrors the truncating float-to-int
/// arithmetic the report always used.
pub fn pressure_percent(rss_kb: i64, total_kb: i64) -> i64 {
    if total_kb <= 0 {
        return 0;
    }
    ((rss_kb as f64 / total_kb as f64) * 100.0) as i64
}

/// Reads memory accounting files under a proc root.
pub struct MemoryReader<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> MemoryReader<F> {
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// System total memory in kB, from `<proc>/meminfo`.
    pub fn system_total_kb(&self) -> Result<i64, MemoryError> {
        let path = format!("{}/meminfo", self.proc_path);
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|source| MemoryError::Io {
                what: "meminfo",
                source,
            })?;
        parse_labeled_kb(&content, "MemTotal").ok_or(MemoryError::Missing { what: "MemTotal" })
    }

    /// RSS/PSS/USS of one process from its `smaps_rollup`.
    ///
    /// Fails whole if any of the four mandatory counters is absent;
    /// no partial snapshot is ever returned.
    pub fn usage(&self, pid: u32) -> Result<MemoryUsage, MemoryError> {
        let path = format!("{}/{}/smaps_rollup", self.proc_path, pid);
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|source| MemoryError::Io {
                what: "smaps_rollup",
                source,
            })?;
        let counters = parse_smaps_rollup(&content).map_err(|_| MemoryError::Missing {
            what: "smaps_rollup counters",
        })?;
        Ok(MemoryUsage {
            rss_kb: counters.rss,
            pss_kb: counters.pss,
            uss_kb: counters.uss(),
        })
    }

    /// Page-table footprint in kB, from the `VmPTE` line of
    /// `<proc>/[pid]/status`.
    pub fn page_tables_kb(&self, pid: u32) -> Result<i64, MemoryError> {
        let path = format!("{}/{}/status", self.proc_path, pid);
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|source| MemoryError::Io {
                what: "status",
                source,
            })?;
        parse_labeled_kb(&content, "VmPTE").ok_or(MemoryError::Missing { what: "VmPTE" })
    }

    /// OOM score and adjustment; both files must yield an integer.
    pub fn oom_score(&self, pid: u32) -> Result<OomScore, MemoryError> {
        let score = self.read_oom_file(pid, "oom_score")?;
        let adj = self.read_oom_file(pid, "oom_score_adj")?;
        Ok(OomScore { score, adj })
    }

    fn read_oom_file(&self, pid: u32, name: &'static str) -> Result<i32, MemoryError> {
        let path = format!("{}/{}/{}", self.proc_path, pid, name);
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|source| MemoryError::Io { what: name, source })?;
        parse_scalar_i32(&content).ok_or(MemoryError::Missing { what: name })
    }
}
