// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mempool scan: fetch pending transactions and keep the DeFi ones.

use tracing::{info, warn};

use crate::classifier::TransactionClassifier;
use crate::error::FetchError;
use crate::sources::MempoolSource;
use crate::types::ClassifiedTransaction;

pub async fn scan_mempool<S: MempoolSource>(
    source: &S,
    classifier: &TransactionClassifier,
) -> Result<Vec<ClassifiedTransaction>, FetchError> {
    let pending = match source.fetch_pending_transactions().await {
        Ok(txs) => txs,
        Err(e) => {
            warn!("Mempool fetch failed: {}", e);
            return Err(e);
        }
    };

    let total = pending.len();
    let relevant: Vec<ClassifiedTransaction> = pending
        .into_iter()
        .map(|tx| classifier.annotate(tx))
        .filter(|c| c.is_defi_relevant)
        .collect();

    info!("🔎 Found {} DeFi transactions in mempool ({} pending)", relevant.len(), total);
    Ok(relevant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ClassificationRules;
    use crate::sources::fake::FakeMempool;
    use crate::types::RawTransaction;
    use alloy::primitives::{Address, Bytes, B256, U256};
    use std::sync::Arc;

    fn tx(n: u8, to: Option<Address>, input: &[u8]) -> RawTransaction {
        RawTransaction {
            hash: B256::repeat_byte(n),
            recipient: to,
            value_wei: U256::from(n),
            gas_price_wei: 1_000_000_000,
            input: Bytes::copy_from_slice(input),
            observed_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn keeps_relevant_in_source_order() {
        let classifier = TransactionClassifier::new(Arc::new(ClassificationRules::mainnet().unwrap()));
        let balancer: Address = "0xBA12222222228d8Ba445958a75a0704d566BF2C8".parse().unwrap();
        let other = Address::repeat_byte(0x77);

        let source = FakeMempool(Ok(vec![
            tx(1, Some(other), &[0xa9, 0x05, 0x9c, 0xbb]),
            tx(2, None, &[0xa9, 0x05, 0x9c, 0xbb]),
            tx(3, Some(other), &[0x01]),
            tx(4, Some(balancer), &[]),
            tx(5, Some(other), &[0x12, 0x34, 0x56, 0x78]),
        ]));

        let found = scan_mempool(&source, &classifier).await.unwrap();
        let hashes: Vec<B256> = found.iter().map(|c| c.tx.hash).collect();
        assert_eq!(hashes, vec![B256::repeat_byte(1), B256::repeat_byte(4)]);
        assert!(found.iter().all(|c| c.is_defi_relevant));
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let classifier = TransactionClassifier::new(Arc::new(ClassificationRules::mainnet().unwrap()));
        let source = FakeMempool(Err(FetchError::NoPendingBlock));
        assert_eq!(
            scan_mempool(&source, &classifier).await.unwrap_err(),
            FetchError::NoPendingBlock
        );
    }
}
