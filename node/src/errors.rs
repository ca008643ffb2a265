// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use indexer_kernel::error::DigestError;
use indexer_kernel::event::EventPosition;
use indexer_kernel::types::id::ChainId;
use indexer_kernel::CompileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("event {position} on chain {chain_id} is behind cursor {cursor} and was never applied")]
    OutOfOrder {
        chain_id: ChainId,
        position: EventPosition,
        cursor: EventPosition,
    },

    #[error("event {position} on chain {chain_id} is older than the replay window (oldest kept: {oldest})")]
    BeyondReplayWindow {
        chain_id: ChainId,
        position: EventPosition,
        oldest: EventPosition,
    },

    #[error(transparent)]
    Digest(#[from] DigestError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
