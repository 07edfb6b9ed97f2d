// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Node RPC source for pending transactions and gas price.

use alloy::eips::BlockNumberOrTag;
use alloy::providers::{DynProvider, Provider};
use chrono::Utc;
use tracing::debug;

use super::{GasSource, MempoolSource};
use crate::error::FetchError;
use crate::types::RawTransaction;

#[derive(Clone)]
pub struct NodeClient {
    provider: DynProvider,
}

impl NodeClient {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }
}

impl MempoolSource for NodeClient {
    async fn fetch_pending_transactions(&self) -> Result<Vec<RawTransaction>, FetchError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Pending)
            .full()
            .await
            .map_err(|e| FetchError::Rpc(format!("eth_getBlockByNumber failed: {e}")))?
            .ok_or(FetchError::NoPendingBlock)?;

        let observed_at = Utc::now();
        let txs: Vec<RawTransaction> = block
            .transactions
            .into_transactions()
            .map(|tx| {
                let gas_price_wei = alloy::consensus::Transaction::gas_price(&tx)
                    .unwrap_or_else(|| alloy::consensus::Transaction::max_fee_per_gas(&tx));
                RawTransaction {
                    hash: alloy::network::TransactionResponse::tx_hash(&tx),
                    recipient: alloy::consensus::Transaction::to(&tx),
                    value_wei: alloy::consensus::Transaction::value(&tx),
                    gas_price_wei,
                    input: alloy::consensus::Transaction::input(&tx).clone(),
                    observed_at,
                }
            })
            .collect();

        debug!("Pending block carries {} transactions", txs.len());
        Ok(txs)
    }
}

impl GasSource for NodeClient {
    async fn fetch_base_gas_price(&self) -> Result<f64, FetchError> {
        let wei = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| FetchError::Rpc(format!("eth_gasPrice failed: {e}")))?;
        Ok(wei_to_gwei(wei))
    }
}

pub fn wei_to_gwei(wei: u128) -> f64 {
    wei as f64 / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_wei_to_gwei() {
        assert_eq!(wei_to_gwei(0), 0.0);
        assert_eq!(wei_to_gwei(25_000_000_000), 25.0);
        assert_eq!(wei_to_gwei(1_500_000_000), 1.5);
    }
}
