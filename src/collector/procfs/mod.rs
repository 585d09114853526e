//! Readers for per-process and system-wide `/proc` files.

pub mod ancestry;
pub mod identity;
pub mod mappings;
pub mod memory;
pub mod parser;
