// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! IPFS metadata fetcher.
//!
//! # Guarantees
//! - Every gateway is tried once per pass, in configured order
//! - At most `fetch_attempts` passes, with a linearly growing pause between them
//! - The last gateway error is returned when every pass fails

use std::time::Duration;

use indexer_kernel::error::PortError;
use indexer_kernel::ports::ContentFetcher;
use reqwest::Client;
use serde_json::Value;

use crate::config::NodeConfig;
use crate::errors::NodeError;

#[derive(Debug, Clone)]
pub struct IpfsFetcher {
    gateways: Vec<String>,
    client: Client,
    timeout: Duration,
    attempts: u32,
    backoff: Duration,
}

impl IpfsFetcher {
    pub fn new(cfg: &NodeConfig) -> Result<Self, NodeError> {
        let timeout = Duration::from_secs(cfg.fetch_timeout_secs);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            gateways: cfg.ipfs_gateways.iter().map(|g| g.trim_end_matches('/').to_string()).collect(),
            client,
            timeout,
            attempts: cfg.fetch_attempts.max(1),
            backoff: Duration::from_millis(cfg.fetch_backoff_ms),
        })
    }

    pub fn gateways(&self) -> &[String] {
        &self.gateways
    }

    async fn fetch_from(&self, gateway: &str, cid: &str) -> Result<Value, PortError> {
        let url = format!("{}/ipfs/{}", gateway, cid);
        let resp = self.client.get(&url).send().await.map_err(|e| self.port_error(e))?;

        if !resp.status().is_success() {
            return Err(PortError::Failed(format!("{} returned {}", url, resp.status())));
        }

        resp.json().await.map_err(|e| {
            if e.is_decode() {
                PortError::Malformed(format!("{}: {}", url, e))
            } else {
                self.port_error(e)
            }
        })
    }

    fn port_error(&self, e: reqwest::Error) -> PortError {
        if e.is_timeout() {
            PortError::Timeout(self.timeout.as_millis() as u64)
        } else {
            PortError::Failed(e.to_string())
        }
    }
}

impl ContentFetcher for IpfsFetcher {
    async fn fetch_content(&self, pointer: &str) -> Result<Value, PortError> {
        if self.gateways.is_empty() {
            return Err(PortError::Unavailable("no IPFS gateways configured".into()));
        }

        let mut last_err = PortError::Unavailable(pointer.to_string());
        for pass in 0..self.attempts {
            if pass > 0 {
                tokio::time::sleep(self.backoff * pass).await;
            }
            for gateway in &self.gateways {
                match self.fetch_from(gateway, pointer).await {
                    Ok(doc) => return Ok(doc),
                    Err(e) => {
                        tracing::warn!("Fetch of {} from {} failed (pass {}): {}", pointer, gateway, pass + 1, e);
                        last_err = e;
                    }
                }
            }
        }
        Err(last_err)
    }
}
