//! Fixed-width report formatting.
//!
//! Pure functions returning the exact lines the poll loop prints.
//! Downstream scrapers key on the socket column widths (protocol 6,
//! state 13, addresses 45, ports 8, queues 10) and on the 16-hex-digit
//! mapping start addresses; treat every width here as a wire format.

use crate::collector::net::SocketRecord;
use crate::collector::procfs::ancestry::AncestorInfo;
use crate::collector::procfs::memory::MemorySnapshot;
use crate::collector::procfs::parser::MapRegion;

pub const BASIC_BANNER: &str = "##### PROCESS BASIC INFORMATION #####";
pub const MEMORY_BANNER: &str = "##### PROCESS MEMORY INFORMATION #####";
pub const TREE_BANNER: &str = "##### PROCESS TREE INFORMATION #####";
pub const MAPPING_BANNER: &str = "##### PROCESS MEMORY MAPPING INFORMATION #####";
pub const NETWORK_BANNER: &str = "##### PROCESS NETWORK CONNECTION INFORMATION #####";

/// Notice printed when the memory-pressure gate holds back the report.
pub const BELOW_THRESHOLD_NOTICE: &str =
    "Process memory usage is not equal to or greater than input memory pressure threshold";

/// Basic information section body.
pub fn basic_section(pid: u32, exe: &str) -> String {
    format!("PID: {}\nExecutable Absolute Path: {}", pid, exe)
}

/// Memory information section body; OOM lines only when available.
pub fn memory_section(snapshot: &MemorySnapshot) -> String {
    let mut out = format!(
        "Total System Memory: {} kB\n\
         Process RSS Memory Usage: {} kB\n\
         Process PSS Memory Usage: {} kB\n\
         Process USS Memory Usage: {} kB\n\
         Process Page Tables Usage: {} kB",
        snapshot.total_kb,
        snapshot.usage.rss_kb,
        snapshot.usage.pss_kb,
        snapshot.usage.uss_kb,
        snapshot.page_tables_kb,
    );
    if let Some(oom) = snapshot.oom {
        out.push_str(&format!(
            "\nProcess OOM Score: {}\nProcess OOM Score Adjustment Value: {}",
            oom.score, oom.adj
        ));
    }
    out
}

/// One ancestor line of the process tree section.
pub fn ancestor_row(info: &AncestorInfo) -> String {
    format!(
        "PID: {} | Name: {} | RSS: {} kB | PSS: {} kB | USS: {} kB | OOM Score: {} | OOM Score Adj: {}",
        info.pid,
        info.name,
        info.rss_kb,
        info.pss_kb,
        info.uss_kb,
        info.oom_score,
        info.oom_score_adj
    )
}

/// Header of the memory mapping section.
pub fn mapping_header() -> String {
    format!(
        "{:<16}  {:<15}     {:<5} {:<6} {:<12} {}",
        "START ADDRESS", "SIZE", "PERM", "DEV", "INODE", "FILE PATH"
    )
}

/// One mapping row: zero-padded 16-digit start address, size in kB,
/// permission bits, device, inode, path.
pub fn mapping_row(region: &MapRegion) -> String {
    format!(
        "{:016x}  {:<15} kB  {:<5} {:<6} {:<12} {}",
        region.start,
        region.size_kb(),
        region.perms,
        region.dev,
        region.inode,
        region.path
    )
}

/// Header of the network connection section.
pub fn socket_header() -> String {
    format!(
        "{:<6}{:<13}{:<45}{:<8}{:<45}{:<8}{:<10}{:<10}",
        "PROT", "STATE", "L.ADDR", "L.PORT", "R.ADDR", "R.PORT", "TX QUEUE", "RX QUEUE"
    )
}

/// One socket row in the fixed column grid.
pub fn socket_row(record: &SocketRecord) -> String {
    format!(
        "{:<6}{:<13}{:<45}{:<8}{:<45}{:<8}{:<10}{:<10}",
        record.protocol.table_name(),
        record.state.name(),
        record.local_addr,
        record.local_port,
        record.remote_addr,
        record.remote_port,
        record.tx_queue,
        record.rx_queue
    )
}
