//! Kernel socket table loading (`/proc/net/{tcp,udp,tcp6,udp6}`).
//!
//! One parser handles all four tables; the IPv4/IPv6 difference is a
//! data-width parameter on [`Protocol`], not duplicated control flow.

mod parser;

use crate::collector::traits::FileSystem;
use std::io;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;

/// Transport/address-family of one kernel socket table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Tcp6,
    Udp6,
}

impl Protocol {
    /// Table name under `<proc>/net/`, identical to the display label.
    pub fn table_name(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Tcp6 => "tcp6",
            Protocol::Udp6 => "udp6",
        }
    }

    /// Width of one address field in raw bytes: 4 for IPv4, 16 for IPv6.
    pub fn addr_bytes(&self) -> usize {
        match self {
            Protocol::Tcp | Protocol::Udp => 4,
            Protocol::Tcp6 | Protocol::Udp6 => 16,
        }
    }

    /// Whether a load failure is advisory rather than fatal for the
    /// tick's socket report. IPv6 tables are absent on kernels booted
    /// with IPv6 disabled.
    pub fn optional(&self) -> bool {
        matches!(self, Protocol::Tcp6 | Protocol::Udp6)
    }
}

impl FromStr for Protocol {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, NetError> {
        match s {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            "tcp6" => Ok(Protocol::Tcp6),
            "udp6" => Ok(Protocol::Udp6),
            other => Err(NetError::UnsupportedProtocol(other.to_string())),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Connection state of a socket table entry.
///
/// Discriminants are the kernel's 1-byte state codes. UDP sockets reuse
/// the same code space (an unconnected UDP socket reports CLOSE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SocketState {
    Established = 1,
    SynSent = 2,
    SynRecv = 3,
    FinWait1 = 4,
    FinWait2 = 5,
    TimeWait = 6,
    Close = 7,
    CloseWait = 8,
    LastAck = 9,
    Listen = 10,
    Closing = 11,
}

impl SocketState {
    /// Decodes a kernel state code. Codes outside `0x01..=0x0B` are a
    /// parse failure for the carrying line, never an out-of-bounds read.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(SocketState::Established),
            2 => Some(SocketState::SynSent),
            3 => Some(SocketState::SynRecv),
            4 => Some(SocketState::FinWait1),
            5 => Some(SocketState::FinWait2),
            6 => Some(SocketState::TimeWait),
            7 => Some(SocketState::Close),
            8 => Some(SocketState::CloseWait),
            9 => Some(SocketState::LastAck),
            10 => Some(SocketState::Listen),
            11 => Some(SocketState::Closing),
            _ => None,
        }
    }

    /// Fixed display name, matching the classic netstat spelling.
    pub fn name(&self) -> &'static str {
        match self {
            SocketState::Established => "ESTABLISHED",
            SocketState::SynSent => "SYN_SENT",
            SocketState::SynRecv => "SYN_RECV",
            SocketState::FinWait1 => "FIN_WAIT1",
            SocketState::FinWait2 => "FIN_WAIT2",
            SocketState::TimeWait => "TIME_WAIT",
            SocketState::Close => "CLOSE",
            SocketState::CloseWait => "CLOSE_WAIT",
            SocketState::LastAck => "LAST_ACK",
            SocketState::Listen => "LISTEN",
            SocketState::Closing => "CLOSING",
        }
    }
}

/// One parsed socket table entry. Immutable once parsed; discarded with
/// its table at the end of the poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketRecord {
    pub protocol: Protocol,
    pub state: SocketState,
    pub local_addr: IpAddr,
    pub local_port: u16,
    pub remote_addr: IpAddr,
    pub remote_port: u16,
    pub tx_queue: u64,
    pub rx_queue: u64,
    pub inode: u64,
}

/// Ordered collection of socket records for one protocol, rebuilt fresh
/// every tick. Record order carries no semantic meaning.
#[derive(Debug, Clone)]
pub struct SocketTable {
    protocol: Protocol,
    records: Vec<SocketRecord>,
}

impl SocketTable {
    /// Parses the full text of one kernel socket table.
    ///
    /// The first line is the column header. Malformed lines are dropped
    /// without aborting the load.
    pub fn parse(protocol: Protocol, content: &str) -> Self {
        let records = content
            .lines()
            .skip(1)
            .filter_map(|line| parser::parse_socket_line(line, protocol))
            .collect();
        Self { protocol, records }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SocketRecord> {
        self.records.iter()
    }

    /// Linear scan for all records with the given inode. The kernel may
    /// reuse an inode across tables, so a caller probing several tables
    /// can legitimately collect multiple matches.
    pub fn lookup(&self, inode: u64) -> impl Iterator<Item = &SocketRecord> {
        self.records.iter().filter(move |r| r.inode == inode)
    }
}

/// Error type for socket table loading.
#[derive(Debug)]
pub enum NetError {
    /// Protocol string was none of `tcp|udp|tcp6|udp6`.
    UnsupportedProtocol(String),
    /// Table file could not be opened or read.
    Open {
        protocol: Protocol,
        source: io::Error,
    },
}

impl std::fmt::Display for NetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetError::UnsupportedProtocol(s) => {
                write!(f, "unsupported protocol {:?} (expected tcp|udp|tcp6|udp6)", s)
            }
            NetError::Open { protocol, source } => {
                write!(f, "failed to open {} socket table: {}", protocol, source)
            }
        }
    }
}

impl std::error::Error for NetError {}

/// Loads protocol socket tables from `<proc>/net/`.
pub struct SocketTableLoader<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> SocketTableLoader<F> {
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Reads and parses one protocol's table.
    ///
    /// The backing file is consumed whole before any record is handed
    /// out, so a returned table is always complete for this tick.
    pub fn load(&self, protocol: Protocol) -> Result<SocketTable, NetError> {
        let path = format!("{}/net/{}", self.proc_path, protocol.table_name());
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|source| NetError::Open { protocol, source })?;
        Ok(SocketTable::parse(protocol, &content))
    }
}
