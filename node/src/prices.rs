// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use indexer_kernel::error::PortError;
use indexer_kernel::ports::PriceFeed;
use indexer_kernel::types::address::Address;
use indexer_kernel::types::id::ChainId;
use indexer_kernel::types::value::TokenAmount;
use rustc_hash::FxHashMap;

use crate::config::TokenPrice;

/// Fixed per-token USD prices, independent of block height.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed {
    prices: FxHashMap<(ChainId, Address), (u8, f64)>,
}

impl StaticPriceFeed {
    pub fn new(prices: &[TokenPrice]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|p| ((p.chain_id, p.token), (p.decimals, p.usd_price)))
                .collect(),
        }
    }
}

impl PriceFeed for StaticPriceFeed {
    async fn convert_to_usd(
        &self,
        chain_id: ChainId,
        token: Address,
        amount: TokenAmount,
        _block_number: u64,
    ) -> Result<f64, PortError> {
        let (decimals, usd_price) = self
            .prices
            .get(&(chain_id, token))
            .copied()
            .ok_or_else(|| PortError::Unavailable(format!("no price for {} on chain {}", token, chain_id)))?;
        Ok(amount.0 as f64 / 10f64.powi(decimals as i32) * usd_price)
    }
}
