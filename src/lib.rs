// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! indexer-kernel: deterministic compiler from decoded Allo V1 events to
//! storage changesets.
//!
//! The kernel is a pure library boundary. It reads through injected ports,
//! never writes, and keeps no state between events.

pub mod config;
pub mod error;
pub mod types;
pub mod event;
pub mod identity;
pub mod roles;
pub mod changeset;
pub mod ports;
pub mod compiler;
pub mod state;

pub use changeset::Changeset;
pub use compiler::Compiler;
pub use error::{CompileError, CompileErrorKind, PortError};
pub use event::EventRecord;
pub use ports::Ports;

#[cfg(test)]
pub mod tests;
