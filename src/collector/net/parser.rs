//! Line parser for the kernel's textual socket tables.
//!
//! Field layout after the header row, whitespace separated:
//!
//! ```text
//! sl: local:port rem:port st tx:rx tr:tm->when retrnsmt uid timeout inode ...
//! ```
//!
//! Addresses and ports are hex; the address width depends on the family.

use super::{Protocol, SocketRecord, SocketState};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Index of the socket inode column; lines shorter than this are dropped.
const MIN_FIELDS: usize = 10;

/// Parses one table line into a record.
///
/// Returns `None` for the header, truncated lines, unknown state codes,
/// address text of the wrong width and zero inodes. Per-line failures
/// never abort the surrounding table load.
pub(crate) fn parse_socket_line(line: &str, protocol: Protocol) -> Option<SocketRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let (local_addr, local_port) = parse_endpoint(fields[1], protocol)?;
    let (remote_addr, remote_port) = parse_endpoint(fields[2], protocol)?;

    let code = u8::from_str_radix(fields[3], 16).ok()?;
    let state = SocketState::from_code(code)?;

    let (tx_hex, rx_hex) = fields[4].split_once(':')?;
    let tx_queue = u64::from_str_radix(tx_hex, 16).ok()?;
    let rx_queue = u64::from_str_radix(rx_hex, 16).ok()?;

    let inode: u64 = fields[9].parse().ok()?;
    if inode == 0 {
        return None;
    }

    Some(SocketRecord {
        protocol,
        state,
        local_addr,
        local_port,
        remote_addr,
        remote_port,
        tx_queue,
        rx_queue,
        inode,
    })
}

/// Splits a `hexaddr:hexport` endpoint field.
fn parse_endpoint(field: &str, protocol: Protocol) -> Option<(IpAddr, u16)> {
    let (addr_hex, port_hex) = field.split_once(':')?;
    let addr = decode_addr(addr_hex, protocol)?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;
    Some((addr, port))
}

/// Decodes the hex address text for either family.
///
/// The kernel emits the in-memory (network-order) address as one 32-bit
/// hex word per 4 bytes, so each word's little-endian byte layout is the
/// wire address: `0100007F` is 127.0.0.1, and the 32-digit IPv6 form
/// `…01000000` is ::1. No byte swap beyond that is applied.
fn decode_addr(hex: &str, protocol: Protocol) -> Option<IpAddr> {
    if hex.len() != protocol.addr_bytes() * 2 || !hex.is_ascii() {
        return None;
    }

    match protocol.addr_bytes() {
        4 => {
            let word = u32::from_str_radix(hex, 16).ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(word.to_le_bytes())))
        }
        _ => {
            let mut bytes = [0u8; 16];
            for (i, chunk) in bytes.chunks_exact_mut(4).enumerate() {
                let word = u32::from_str_radix(&hex[i * 8..i * 8 + 8], 16).ok()?;
                chunk.copy_from_slice(&word.to_le_bytes());
            }
            Some(IpAddr::V6(Ipv6Addr::from(bytes)))
        }
    }
}
