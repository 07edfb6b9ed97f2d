// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Profit models for arbitrage and liquidation signals.

use crate::types::AccountPosition;

/// Estimates the profit of buying at `buy_price` on one venue and selling at `sell_price` on another.
pub trait ArbitrageCostModel: Send + Sync {
    fn estimate_profit(&self, buy_price: f64, sell_price: f64) -> f64;
}

/// Estimates the profit of liquidating a position.
pub trait LiquidationValuation: Send + Sync {
    fn estimate_profit(&self, position: &AccountPosition) -> f64;
}

/// Fixed notional traded on both legs, each leg paying a percentage fee.
#[derive(Debug, Clone, Copy)]
pub struct NotionalCostModel {
    pub notional_usd: f64,
    pub fee_pct_per_leg: f64,
}

impl Default for NotionalCostModel {
    fn default() -> Self {
        Self {
            notional_usd: 10_000.0,
            fee_pct_per_leg: 0.3,
        }
    }
}

impl ArbitrageCostModel for NotionalCostModel {
    fn estimate_profit(&self, buy_price: f64, sell_price: f64) -> f64 {
        if buy_price <= 0.0 {
            return 0.0;
        }
        let gross = self.notional_usd * (sell_price / buy_price - 1.0);
        let fees = self.notional_usd * 2.0 * self.fee_pct_per_leg / 100.0;
        gross - fees
    }
}

/// Liquidator repays `close_factor` of the debt and receives `bonus_pct` on top in collateral.
#[derive(Debug, Clone, Copy)]
pub struct CloseFactorBonus {
    pub close_factor: f64,
    pub bonus_pct: f64,
}

impl Default for CloseFactorBonus {
    fn default() -> Self {
        // Aave V2 defaults
        Self {
            close_factor: 0.5,
            bonus_pct: 5.0,
        }
    }
}

impl LiquidationValuation for CloseFactorBonus {
    fn estimate_profit(&self, position: &AccountPosition) -> f64 {
        let repayable = position.debt_value * self.close_factor;
        // Can't seize more than the collateral that's there.
        let seized = (repayable * (1.0 + self.bonus_pct / 100.0)).min(position.collateral_value);
        (seized - repayable).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    fn position(collateral: f64, debt: f64) -> AccountPosition {
        AccountPosition {
            borrower: Address::ZERO,
            collateral_value: collateral,
            debt_value: debt,
            liquidation_threshold: 0.8,
            collateral_asset: "ETH".into(),
            debt_asset: "ETH".into(),
        }
    }

    #[test]
    fn notional_model_subtracts_fees() {
        let model = NotionalCostModel {
            notional_usd: 1_000.0,
            fee_pct_per_leg: 0.1,
        };
        // 1% gross on 1000 = 10, fees 2 * 1 = 2
        let profit = model.estimate_profit(100.0, 101.0);
        assert!((profit - 8.0).abs() < 1e-9);
        assert_eq!(model.estimate_profit(0.0, 101.0), 0.0);
    }

    #[test]
    fn close_factor_bonus_on_healthy_collateral() {
        let model = CloseFactorBonus::default();
        // repay 50, seize 52.5
        let profit = model.estimate_profit(&position(120.0, 100.0));
        assert!((profit - 2.5).abs() < 1e-9);
    }

    #[test]
    fn close_factor_bonus_capped_by_collateral() {
        let model = CloseFactorBonus::default();
        assert_eq!(model.estimate_profit(&position(40.0, 100.0)), 0.0);
    }
}
