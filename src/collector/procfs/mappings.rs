//! Virtual memory region table reader (`/proc/[pid]/maps`).

use crate::collector::procfs::parser::{MapRegion, parse_maps_line};
use crate::collector::traits::FileSystem;
use std::io;
use std::path::Path;

/// Reads the memory mapping table of one process.
pub struct MappingsReader<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> MappingsReader<F> {
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Parses all regions of `<proc>/[pid]/maps`, dropping malformed
    /// lines. An unreadable file is the caller's decision to handle;
    /// the mapping section is omitted rather than the tick aborted.
    pub fn regions(&self, pid: u32) -> io::Result<Vec<MapRegion>> {
        let path = format!("{}/{}/maps", self.proc_path, pid);
        let content = self.fs.read_to_string(Path::new(&path))?;
        Ok(content.lines().filter_map(parse_maps_line).collect())
    }
}
