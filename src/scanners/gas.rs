// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gas price tiers.

use tracing::debug;

use crate::error::FetchError;
use crate::sources::GasSource;
use crate::types::GasTiers;

/// Priority tier, from cheapest to most aggressive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasTier {
    /// base * 0.8, may wait several blocks.
    Slow,
    /// base price as reported by the node.
    Standard,
    /// base * 1.2
    Fast,
    /// base * 1.5, next block.
    Instant,
}

impl GasTier {
    pub const ALL: [GasTier; 4] = [Self::Slow, Self::Standard, Self::Fast, Self::Instant];

    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Slow => 0.8,
            Self::Standard => 1.0,
            Self::Fast => 1.2,
            Self::Instant => 1.5,
        }
    }

    pub fn price(&self, base_gwei: f64) -> f64 {
        base_gwei * self.multiplier()
    }
}

pub fn compute_tiers(base_gwei: f64) -> GasTiers {
    GasTiers {
        slow: GasTier::Slow.price(base_gwei),
        standard: GasTier::Standard.price(base_gwei),
        fast: GasTier::Fast.price(base_gwei),
        instant: GasTier::Instant.price(base_gwei),
    }
}

pub async fn scan_gas<S: GasSource>(source: &S) -> Result<GasTiers, FetchError> {
    let base = source.fetch_base_gas_price().await?;
    debug!("⛽ Base gas price: {:.2} gwei", base);
    Ok(compute_tiers(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fake::FakeGas;

    #[test]
    fn tiers_for_hundred_gwei() {
        let tiers = compute_tiers(100.0);
        assert_eq!(
            tiers,
            GasTiers {
                slow: 80.0,
                standard: 100.0,
                fast: 120.0,
                instant: 150.0,
            }
        );
    }

    #[test]
    fn tiers_are_monotonic() {
        for base in [0.0, 0.001, 1.0, 37.5, 1_000.0, 1e9] {
            let t = compute_tiers(base);
            assert!(t.slow <= t.standard, "base {}", base);
            assert!(t.standard <= t.fast, "base {}", base);
            assert!(t.fast <= t.instant, "base {}", base);
        }
    }

    #[test]
    fn tier_order_matches_multipliers() {
        let multipliers: Vec<f64> = GasTier::ALL.iter().map(GasTier::multiplier).collect();
        assert_eq!(multipliers, vec![0.8, 1.0, 1.2, 1.5]);
    }

    #[tokio::test]
    async fn zero_base_is_valid() {
        let tiers = scan_gas(&FakeGas(Ok(0.0))).await.unwrap();
        assert_eq!(tiers.instant, 0.0);
    }

    #[tokio::test]
    async fn fetch_failure_yields_no_tiers() {
        let err = scan_gas(&FakeGas(Err(FetchError::Rpc("timeout".into()))))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Rpc("timeout".into()));
    }
}
