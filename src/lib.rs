//! memwatch — periodic inspector for a single target process.
//!
//! Watches one Linux process and reports its memory footprint, ancestry,
//! virtual-memory mappings and active network sockets by reading the
//! kernel's `/proc` exposition files.
//!
//! Provides:
//! - `collector` — `/proc` readers: memory accounting, ancestry walk,
//!   memory mappings, socket tables, descriptor/socket correlation
//! - `report` — fixed-width report formatting

pub mod collector;
pub mod report;
