// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::collections::BTreeMap;
use std::path::Path;

use indexer_kernel::error::PortError;
use indexer_kernel::ports::ContentFetcher;
use serde_json::Value;

use crate::errors::NodeError;
use crate::ipfs::IpfsFetcher;

/// Metadata documents keyed by pointer, for offline runs.
#[derive(Debug, Clone, Default)]
pub struct RecordedContent {
    documents: BTreeMap<String, Value>,
}

impl RecordedContent {
    pub fn from_json(json: &str) -> Result<Self, NodeError> {
        Ok(Self { documents: serde_json::from_str(json)? })
    }

    pub fn from_file(path: &Path) -> Result<Self, NodeError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl ContentFetcher for RecordedContent {
    async fn fetch_content(&self, pointer: &str) -> Result<Value, PortError> {
        self.documents
            .get(pointer)
            .cloned()
            .ok_or_else(|| PortError::Unavailable(format!("no recorded content for {}", pointer)))
    }
}

/// Content source picked at startup.
#[derive(Debug, Clone)]
pub enum ContentSource {
    Ipfs(IpfsFetcher),
    Recorded(RecordedContent),
}

impl ContentFetcher for ContentSource {
    async fn fetch_content(&self, pointer: &str) -> Result<Value, PortError> {
        match self {
            ContentSource::Ipfs(f) => f.fetch_content(pointer).await,
            ContentSource::Recorded(f) => f.fetch_content(pointer).await,
        }
    }
}
