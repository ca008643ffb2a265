// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.
//!
//! Every failure aborts the single event being compiled. No partial changeset
//! list is ever returned; the caller decides whether to halt, skip or retry.

use thiserror::Error;

use crate::types::address::Address;
use crate::types::id::ChainId;
use crate::types::value::DecodeError;

/// Failure reported by a capability port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("call failed: {0}")]
    Failed(String),

    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("not available: {0}")]
    Unavailable(String),

    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileErrorKind {
    #[error("on-chain read {function}() on {address} failed: {source}")]
    ExternalReadFailure {
        address: Address,
        function: &'static str,
        #[source]
        source: PortError,
    },

    #[error("content fetch for {pointer:?} failed: {source}")]
    ContentFetchFailure {
        pointer: String,
        #[source]
        source: PortError,
    },

    #[error("entity lookup failed: {0}")]
    LookupFailure(#[source] PortError),

    #[error("price conversion failed: {0}")]
    PriceConversionFailure(#[source] PortError),

    #[error("malformed param {param:?}: {reason}")]
    MalformedEventParams { param: &'static str, reason: String },
}

impl CompileErrorKind {
    pub(crate) fn read(address: Address, function: &'static str, source: PortError) -> Self {
        CompileErrorKind::ExternalReadFailure { address, function, source }
    }

    pub(crate) fn fetch(pointer: &str, source: PortError) -> Self {
        CompileErrorKind::ContentFetchFailure { pointer: pointer.to_string(), source }
    }

    pub(crate) fn param(param: &'static str, err: DecodeError) -> Self {
        CompileErrorKind::MalformedEventParams { param, reason: err.to_string() }
    }

    /// Wrong-shaped read results count as failed reads.
    pub(crate) fn read_shape(address: Address, function: &'static str, err: DecodeError) -> Self {
        CompileErrorKind::ExternalReadFailure {
            address,
            function,
            source: PortError::Malformed(err.to_string()),
        }
    }
}

/// A changeset batch could not be encoded for digesting.
#[derive(Error, Debug)]
#[error("changeset encoding failed: {0}")]
pub struct DigestError(#[from] pub bincode::error::EncodeError);

/// Event-level abort, carrying enough context for the caller's retry/skip decision.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{event_name} on chain {chain_id} at block {block_number}: {kind}")]
pub struct CompileError {
    pub chain_id: ChainId,
    pub event_name: String,
    pub block_number: u64,
    #[source]
    pub kind: CompileErrorKind,
}

pub type Result<T> = core::result::Result<T, CompileErrorKind>;
