//! Parent-pid chain walker.
//!
//! Climbs `/proc/[pid]/stat` parent links until the reported parent pid
//! is 0, pairing each ancestor with a best-effort memory/OOM snapshot.

use crate::collector::procfs::memory::MemoryReader;
use crate::collector::procfs::parser::parse_stat_identity;
use crate::collector::traits::FileSystem;
use std::io;
use std::path::Path;
use tracing::debug;

/// Sentinel for kB counters and OOM score when the fetch failed.
const UNAVAILABLE: i64 = -1;
/// Sentinel for the OOM adjustment, whose real range includes -1000.
const UNAVAILABLE_ADJ: i32 = -9999;

/// One process in the ancestor chain, target first.
#[derive(Debug, Clone, PartialEq)]
pub struct AncestorInfo {
    pub pid: u32,
    pub name: String,
    pub rss_kb: i64,
    pub pss_kb: i64,
    pub uss_kb: i64,
    pub oom_score: i32,
    pub oom_score_adj: i32,
}

/// Error type for a walk that could not even read its starting process.
#[derive(Debug)]
pub enum WalkError {
    Io { pid: u32, source: io::Error },
    Parse { pid: u32, message: String },
}

impl std::fmt::Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkError::Io { pid, source } => {
                write!(f, "failed to read stat of pid {}: {}", pid, source)
            }
            WalkError::Parse { pid, message } => {
                write!(f, "failed to parse stat of pid {}: {}", pid, message)
            }
        }
    }
}

impl std::error::Error for WalkError {}

/// Walks the parent chain of a process.
pub struct AncestryWalker<F: FileSystem> {
    fs: F,
    proc_path: String,
    mem: MemoryReader<F>,
}

impl<F: FileSystem + Clone> AncestryWalker<F> {
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        let proc_path = proc_path.into();
        Self {
            mem: MemoryReader::new(fs.clone(), proc_path.clone()),
            fs,
            proc_path,
        }
    }

    /// Returns the chain from `pid` up to the root, target first.
    ///
    /// Terminates exactly when a stat line reports parent pid 0; for
    /// pid 1 the chain has a single element. An unreadable ancestor ends
    /// the walk with what was gathered, while an unreadable starting pid
    /// is an error. Per-ancestor memory/OOM fetches are best-effort:
    /// failures substitute sentinel values and never abort the walk.
    pub fn walk(&self, pid: u32) -> Result<Vec<AncestorInfo>, WalkError> {
        let mut chain = Vec::new();
        let mut current = pid;

        loop {
            let identity = match self.read_identity(current) {
                Ok(identity) => identity,
                Err(e) if chain.is_empty() => return Err(e),
                Err(e) => {
                    debug!("ancestry walk stopped at pid {}: {}", current, e);
                    break;
                }
            };

            chain.push(self.snapshot(current, identity.comm));

            if identity.ppid == 0 {
                break;
            }
            current = identity.ppid;
        }

        Ok(chain)
    }

    fn read_identity(
        &self,
        pid: u32,
    ) -> Result<crate::collector::procfs::parser::StatIdentity, WalkError> {
        let path = format!("{}/{}/stat", self.proc_path, pid);
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|source| WalkError::Io { pid, source })?;
        parse_stat_identity(&content).map_err(|e| WalkError::Parse {
            pid,
            message: e.message,
        })
    }

    fn snapshot(&self, pid: u32, name: String) -> AncestorInfo {
        let (rss_kb, pss_kb, uss_kb) = match self.mem.usage(pid) {
            Ok(usage) => (usage.rss_kb, usage.pss_kb, usage.uss_kb),
            Err(_) => (UNAVAILABLE, UNAVAILABLE, UNAVAILABLE),
        };
        let (oom_score, oom_score_adj) = match self.mem.oom_score(pid) {
            Ok(oom) => (oom.score, oom.adj),
            Err(_) => (UNAVAILABLE as i32, UNAVAILABLE_ADJ),
        };

        AncestorInfo {
            pid,
            name,
            rss_kb,
            pss_kb,
            uss_kb,
            oom_score,
            oom_score_adj,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_walk_target_to_root() {
        let fs = MockFs::typical_target();
        let walker = AncestryWalker::new(fs, "/proc");

        let chain = walker.walk(4242).unwrap();
        let pids: Vec<u32> = chain.iter().map(|a| a.pid).collect();
        assert_eq!(pids, vec![4242, 1700, 1]);

        assert_eq!(chain[0].name, "leaky");
        assert_eq!(chain[1].name, "bash");
        assert_eq!(chain[2].name, "systemd");

        // snapshots resolved where the files exist
        assert_eq!(chain[0].rss_kb, 8000);
        assert_eq!(chain[0].oom_score, 667);
        assert_eq!(chain[1].uss_kb, 1000); // 400 clean + 600 dirty
        assert_eq!(chain[1].oom_score_adj, 0);
    }

    #[test]
    fn test_walk_substitutes_sentinels() {
        let fs = MockFs::typical_target();
        let walker = AncestryWalker::new(fs, "/proc");

        // pid 1 carries no rollup or oom files in the fixture
        let chain = walker.walk(4242).unwrap();
        let init = &chain[2];
        assert_eq!(init.rss_kb, -1);
        assert_eq!(init.pss_kb, -1);
        assert_eq!(init.uss_kb, -1);
        assert_eq!(init.oom_score, -1);
        assert_eq!(init.oom_score_adj, -9999);
    }

    #[test]
    fn test_walk_pid_1_single_element() {
        let fs = MockFs::typical_target();
        let walker = AncestryWalker::new(fs, "/proc");

        let chain = walker.walk(1).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].pid, 1);
    }

    #[test]
    fn test_walk_unknown_pid_is_error() {
        let walker = AncestryWalker::new(MockFs::typical_target(), "/proc");
        assert!(matches!(
            walker.walk(31337),
            Err(WalkError::Io { pid: 31337, .. })
        ));
    }

    #[test]
    fn test_walk_missing_ancestor_ends_chain() {
        let mut fs = MockFs::typical_target();
        fs.remove("/proc/1700/stat");
        let walker = AncestryWalker::new(fs, "/proc");

        let chain = walker.walk(4242).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].pid, 4242);
    }

    #[test]
    fn test_walk_spaced_comm_truncates_and_terminates() {
        // The displaced ppid field reads as 0, so the walk ends here:
        // the historical tokenization limitation, preserved.
        let fs = MockFs::with_spaced_comm();
        let walker = AncestryWalker::new(fs, "/proc");

        let chain = walker.walk(5000).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name, "Web");
    }
}
