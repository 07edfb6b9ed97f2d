// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! DeFi relevance heuristics for pending transactions.

use std::sync::Arc;
use tracing::debug;

use crate::rules::ClassificationRules;
use crate::types::{ClassifiedTransaction, RawTransaction};

#[derive(Debug, Clone)]
pub struct TransactionClassifier {
    rules: Arc<ClassificationRules>,
}

impl TransactionClassifier {
    pub fn new(rules: Arc<ClassificationRules>) -> Self {
        Self { rules }
    }

    /// Whether the transaction touches a known protocol or calls a known DeFi function.
    pub fn classify(&self, tx: &RawTransaction) -> bool {
        let Some(to) = tx.recipient else {
            return false;
        };

        if let Some(protocol) = self.rules.protocol(&to) {
            debug!("{:?} -> {} ({})", tx.hash, protocol, to);
            return true;
        }

        match tx.selector() {
            Some(selector) => self.rules.function(&selector).is_some(),
            None => false,
        }
    }

    pub fn annotate(&self, tx: RawTransaction) -> ClassifiedTransaction {
        let is_defi_relevant = self.classify(&tx);
        ClassifiedTransaction { tx, is_defi_relevant }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{parse_address, DEFAULT_SELECTORS};
    use alloy::primitives::{Address, Bytes, B256, U256};

    fn classifier() -> TransactionClassifier {
        let rules = ClassificationRules::from_tables(
            &[("aave_lending_pool", "0x7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9")],
            DEFAULT_SELECTORS,
        )
        .unwrap();
        TransactionClassifier::new(Arc::new(rules))
    }

    fn tx(to: Option<Address>, input: &[u8]) -> RawTransaction {
        RawTransaction {
            hash: B256::repeat_byte(0x11),
            recipient: to,
            value_wei: U256::ZERO,
            gas_price_wei: 20_000_000_000,
            input: Bytes::copy_from_slice(input),
            observed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn contract_creation_is_not_relevant() {
        let c = classifier();
        assert!(!c.classify(&tx(None, &[0xa9, 0x05, 0x9c, 0xbb])));
    }

    #[test]
    fn registered_protocol_matches_any_case() {
        let c = classifier();
        for s in [
            "0x7d2768de32b0b80b7a3454c06bdac94a69ddc7a9",
            "0x7D2768DE32B0B80B7A3454C06BDAC94A69DDC7A9",
        ] {
            let to = parse_address(s).unwrap();
            assert!(c.classify(&tx(Some(to), &[])));
        }
    }

    #[test]
    fn short_input_to_unknown_contract_is_not_relevant() {
        let c = classifier();
        let to = Address::repeat_byte(0x42);
        assert!(!c.classify(&tx(Some(to), &[])));
        assert!(!c.classify(&tx(Some(to), &[0xa9, 0x05, 0x9c])));
    }

    #[test]
    fn known_selector_is_relevant() {
        let c = classifier();
        let to = Address::repeat_byte(0x42);
        // approve(address,uint256) with trailing args
        let mut input = vec![0x09, 0x5e, 0xa7, 0xb3];
        input.extend_from_slice(&[0u8; 64]);
        assert!(c.classify(&tx(Some(to), &input)));
        assert!(!c.classify(&tx(Some(to), &[0xde, 0xad, 0xbe, 0xef])));
    }

    #[test]
    fn classification_is_idempotent() {
        let c = classifier();
        let t = tx(Some(Address::repeat_byte(0x01)), &[0x38, 0xed, 0x17, 0x39]);
        assert_eq!(c.classify(&t), c.classify(&t));
        let annotated = c.annotate(t.clone());
        assert!(annotated.is_defi_relevant);
        assert_eq!(annotated.tx, t);
    }
}
