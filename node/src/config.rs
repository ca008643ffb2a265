// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::path::Path;

use indexer_kernel::types::address::Address;
use indexer_kernel::types::id::ChainId;
use serde::{Deserialize, Serialize};

use crate::engine::DEFAULT_REPLAY_WINDOW;
use crate::errors::NodeError;

pub const ENV_IPFS_GATEWAYS: &str = "INDEXER_IPFS_GATEWAYS";
pub const ENV_METRICS_ADDR: &str = "INDEXER_METRICS_ADDR";

/// USD price of one whole token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub chain_id: ChainId,
    pub token: Address,
    pub decimals: u8,
    pub usd_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Tried in order for every content fetch.
    pub ipfs_gateways: Vec<String>,
    pub fetch_timeout_secs: u64,
    /// Full passes over all gateways before a fetch fails.
    pub fetch_attempts: u32,
    /// Delay before pass `n` is `n * fetch_backoff_ms`.
    pub fetch_backoff_ms: u64,
    /// Prometheus listener. No exporter when unset.
    pub metrics_addr: Option<SocketAddr>,
    /// Used when `RUST_LOG` is not set.
    pub log_filter: String,
    pub token_prices: Vec<TokenPrice>,
    /// Recent events per chain whose replays are verified against their digest.
    pub replay_window: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ipfs_gateways: vec!["https://ipfs.io".to_string()],
            fetch_timeout_secs: 10,
            fetch_attempts: 3,
            fetch_backoff_ms: 500,
            metrics_addr: None,
            log_filter: "indexer_node=info,indexer_kernel=info".to_string(),
            token_prices: Vec::new(),
            replay_window: DEFAULT_REPLAY_WINDOW,
        }
    }
}

impl NodeConfig {
    /// Defaults, then the JSON file if given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, NodeError> {
        let mut cfg = match path {
            Some(p) => serde_json::from_slice(&std::fs::read(p)?)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), NodeError> {
        if let Some(gateways) = lookup(ENV_IPFS_GATEWAYS) {
            self.ipfs_gateways = gateways
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(addr) = lookup(ENV_METRICS_ADDR) {
            let parsed = addr
                .parse()
                .map_err(|e| NodeError::Config(format!("{}={:?}: {}", ENV_METRICS_ADDR, addr, e)))?;
            self.metrics_addr = Some(parsed);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.fetch_attempts == 0 {
            return Err(NodeError::Config("fetch_attempts must be at least 1".into()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(NodeError::Config("fetch_timeout_secs must be at least 1".into()));
        }
        if self.replay_window == 0 {
            return Err(NodeError::Config("replay_window must be at least 1".into()));
        }
        if let Some(p) = self.token_prices.iter().find(|p| !p.usd_price.is_finite() || p.usd_price < 0.0) {
            return Err(NodeError::Config(format!("bad usd_price for token {}", p.token)));
        }
        Ok(())
    }
}
