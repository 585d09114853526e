//! Collectors for a single target process on Linux.
//!
//! Everything here reads kernel exposition files through the [`FileSystem`]
//! trait, so each collector works against the real `/proc` in production and
//! against an in-memory [`MockFs`] in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  MemoryReader      /proc/meminfo, smaps_rollup, status, oom  │
//! │  AncestryWalker    /proc/[pid]/stat parent chain             │
//! │  MappingsReader    /proc/[pid]/maps                          │
//! │  SocketTableLoader /proc/net/{tcp,udp,tcp6,udp6}             │
//! │  SocketCorrelator  /proc/[pid]/fd  ⋈  socket tables (inode)  │
//! └───────────────────────────────┬──────────────────────────────┘
//!                                 │
//!                          ┌──────▼──────┐
//!                          │  FileSystem │ (trait)
//!                          └──────┬──────┘
//!                      ┌──────────┴──────────┐
//!               ┌──────▼──────┐       ┌──────▼──────┐
//!               │   RealFs    │       │   MockFs    │
//!               │  (Linux)    │       │  (Testing)  │
//!               └─────────────┘       └─────────────┘
//! ```
//!
//! All collectors take the proc root as a plain path prefix (usually
//! `"/proc"`), which keeps them usable against snapshot trees in tests.

pub mod correlate;
pub mod mock;
pub mod net;
pub mod procfs;
pub mod traits;

pub use correlate::{CorrelateError, FdEntry, FdTarget, SocketCorrelator};
pub use mock::MockFs;
pub use net::{NetError, Protocol, SocketRecord, SocketState, SocketTable, SocketTableLoader};
pub use procfs::ancestry::{AncestorInfo, AncestryWalker, WalkError};
pub use procfs::identity::{IdentityError, ProcessIdentity};
pub use procfs::mappings::MappingsReader;
pub use procfs::memory::{MemoryError, MemoryReader, MemorySnapshot, MemoryUsage, OomScore};
pub use procfs::parser::MapRegion;
pub use traits::{FileSystem, RealFs};
