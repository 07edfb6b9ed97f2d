// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Liquidation candidate scanner for lending protocols.

use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::sources::LendingSource;
use crate::types::{AccountPosition, LendingProtocol, LiquidationCandidate};
use crate::valuation::LiquidationValuation;

/// Positions at or below this health factor can be liquidated.
pub const LIQUIDATION_BOUNDARY: f64 = 1.0;

/// `collateral * threshold / debt`, or `None` when the position has no meaningful ratio.
pub fn health_factor(position: &AccountPosition) -> Option<f64> {
    let AccountPosition {
        collateral_value,
        debt_value,
        liquidation_threshold,
        ..
    } = *position;

    if !(debt_value.is_finite() && debt_value > 0.0) {
        return None;
    }
    if !(collateral_value.is_finite() && collateral_value >= 0.0) {
        return None;
    }
    if !(liquidation_threshold.is_finite() && liquidation_threshold >= 0.0) {
        return None;
    }

    Some(collateral_value * liquidation_threshold / debt_value)
}

pub struct LiquidationScanner {
    protocols: Vec<LendingProtocol>,
    valuation: Arc<dyn LiquidationValuation>,
}

impl LiquidationScanner {
    pub fn new(protocols: Vec<LendingProtocol>, valuation: Arc<dyn LiquidationValuation>) -> Self {
        Self { protocols, valuation }
    }

    /// Scan every protocol concurrently. Errors only when all of them failed.
    pub async fn scan<S: LendingSource>(
        &self,
        source: &S,
    ) -> Result<Vec<LiquidationCandidate>, FetchError> {
        let results = join_all(
            self.protocols
                .iter()
                .map(|protocol| self.scan_protocol(source, protocol)),
        )
        .await;

        let mut candidates = Vec::new();
        let mut failed = 0;
        for (protocol, result) in self.protocols.iter().zip(results) {
            match result {
                Ok(found) => candidates.extend(found),
                Err(e) => {
                    warn!("Error scanning {} liquidations: {}", protocol.name, e);
                    failed += 1;
                }
            }
        }

        if failed > 0 && failed == self.protocols.len() {
            return Err(FetchError::AllFailed(failed));
        }

        info!("💧 Found {} liquidation opportunities", candidates.len());
        Ok(candidates)
    }

    async fn scan_protocol<S: LendingSource>(
        &self,
        source: &S,
        protocol: &LendingProtocol,
    ) -> Result<Vec<LiquidationCandidate>, FetchError> {
        let positions = source.fetch_account_health(protocol).await?;
        let observed_at = Utc::now();

        Ok(positions
            .iter()
            .filter_map(|position| {
                let hf = health_factor(position)?;
                if hf > LIQUIDATION_BOUNDARY {
                    return None;
                }
                debug!(
                    "{}: {:?} liquidatable at health factor {:.4}",
                    protocol.name, position.borrower, hf
                );
                Some(LiquidationCandidate {
                    protocol: protocol.name.clone(),
                    borrower: position.borrower,
                    collateral_asset: position.collateral_asset.clone(),
                    debt_asset: position.debt_asset.clone(),
                    health_factor: hf,
                    liquidation_threshold: position.liquidation_threshold,
                    estimated_profit: self.valuation.estimate_profit(position),
                    observed_at,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fake::FakeLending;
    use crate::valuation::CloseFactorBonus;
    use alloy::primitives::Address;
    use std::collections::HashMap;

    fn position(n: u8, collateral: f64, debt: f64, threshold: f64) -> AccountPosition {
        AccountPosition {
            borrower: Address::repeat_byte(n),
            collateral_value: collateral,
            debt_value: debt,
            liquidation_threshold: threshold,
            collateral_asset: "ETH".into(),
            debt_asset: "ETH".into(),
        }
    }

    fn protocol(name: &str) -> LendingProtocol {
        LendingProtocol {
            name: name.into(),
            pool: Address::repeat_byte(0xaa),
            base_currency: "ETH".into(),
        }
    }

    fn scanner(names: &[&str]) -> LiquidationScanner {
        LiquidationScanner::new(
            names.iter().map(|n| protocol(n)).collect(),
            Arc::new(CloseFactorBonus::default()),
        )
    }

    #[test]
    fn health_factor_formula() {
        let hf = health_factor(&position(1, 100.0, 80.0, 0.8)).unwrap();
        assert!((hf - 1.0).abs() < 1e-12);
        assert_eq!(health_factor(&position(1, 100.0, 0.0, 0.8)), None);
        assert_eq!(health_factor(&position(1, 100.0, -5.0, 0.8)), None);
        assert_eq!(health_factor(&position(1, -1.0, 5.0, 0.8)), None);
        assert_eq!(health_factor(&position(1, 100.0, f64::NAN, 0.8)), None);
        assert_eq!(health_factor(&position(1, 0.0, 10.0, 0.8)), Some(0.0));
    }

    #[tokio::test]
    async fn emits_only_liquidatable_positions() {
        let source = FakeLending(HashMap::from([(
            "Aave".to_string(),
            Ok(vec![
                position(1, 100.0, 80.0, 0.8),  // exactly 1.0
                position(2, 100.0, 90.0, 0.8),  // 0.889
                position(3, 100.0, 50.0, 0.8),  // 1.6
                position(4, 100.0, 0.0, 0.8),   // no debt
            ]),
        )]));

        let found = scanner(&["Aave"]).scan(&source).await.unwrap();
        let borrowers: Vec<Address> = found.iter().map(|c| c.borrower).collect();
        assert_eq!(borrowers, vec![Address::repeat_byte(1), Address::repeat_byte(2)]);
        assert!(found.iter().all(|c| c.health_factor <= 1.0 && c.health_factor >= 0.0));
        assert!(found.iter().all(|c| c.protocol == "Aave"));
    }

    #[tokio::test]
    async fn one_failing_protocol_does_not_block_others() {
        let source = FakeLending(HashMap::from([
            ("Aave".to_string(), Ok(vec![position(1, 100.0, 90.0, 0.8)])),
            ("Compound".to_string(), Err(FetchError::Rpc("timeout".into()))),
        ]));

        let found = scanner(&["Compound", "Aave"]).scan(&source).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].protocol, "Aave");
    }

    #[tokio::test]
    async fn all_protocols_failing_is_an_error() {
        let source = FakeLending::default();
        let err = scanner(&["Aave", "Compound"]).scan(&source).await.unwrap_err();
        assert_eq!(err, FetchError::AllFailed(2));
    }

    #[tokio::test]
    async fn no_protocols_is_empty() {
        let found = scanner(&[]).scan(&FakeLending::default()).await.unwrap();
        assert!(found.is_empty());
    }
}
