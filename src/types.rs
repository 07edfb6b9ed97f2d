// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Value objects produced by the scanners and collected into a snapshot.

use alloy::primitives::{Address, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pending transaction as seen by the node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTransaction {
    pub hash: B256,
    pub recipient: Option<Address>,
    pub value_wei: U256,
    pub gas_price_wei: u128,
    pub input: Bytes,
    pub observed_at: DateTime<Utc>,
}

impl RawTransaction {
    /// Leading 4-byte function selector, if the calldata carries one.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.input.get(..4).and_then(|s| s.try_into().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedTransaction {
    #[serde(flatten)]
    pub tx: RawTransaction,
    pub is_defi_relevant: bool,
}

/// One borrower's account as reported by a lending protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountPosition {
    pub borrower: Address,
    pub collateral_value: f64,
    pub debt_value: f64,
    /// Fraction of collateral value that counts toward the loan, e.g. 0.825.
    pub liquidation_threshold: f64,
    pub collateral_asset: String,
    pub debt_asset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidationCandidate {
    pub protocol: String,
    pub borrower: Address,
    pub collateral_asset: String,
    pub debt_asset: String,
    pub health_factor: f64,
    pub liquidation_threshold: f64,
    pub estimated_profit: f64,
    pub observed_at: DateTime<Utc>,
}

/// Token pair monitored across venues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPair {
    pub name: String,
    pub base: Address,
    pub base_decimals: u8,
    pub quote: Address,
    pub quote_decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub venue: String,
    pub pair: String,
    /// Quote-token units per one base token.
    pub price: f64,
}

impl PriceQuote {
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArbitrageOpportunity {
    pub pair: String,
    pub buy_venue: String,
    pub sell_venue: String,
    pub buy_price: f64,
    pub sell_price: f64,
    pub spread_percent: f64,
    pub estimated_profit: f64,
    pub observed_at: DateTime<Utc>,
}

/// Gas price estimates in gwei.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GasTiers {
    pub slow: f64,
    pub standard: f64,
    pub fast: f64,
    pub instant: f64,
}

/// Everything one scan cycle found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSnapshot {
    pub timestamp: DateTime<Utc>,
    pub mempool_transactions: Vec<ClassifiedTransaction>,
    pub liquidation_opportunities: Vec<LiquidationCandidate>,
    pub arbitrage_opportunities: Vec<ArbitrageOpportunity>,
    pub gas_tiers: Option<GasTiers>,
}

impl ScanSnapshot {
    /// True when the cycle produced at least one actionable signal.
    pub fn has_findings(&self) -> bool {
        !self.liquidation_opportunities.is_empty() || !self.arbitrage_opportunities.is_empty()
    }
}

/// Lending market whose borrowers are checked for liquidation.
#[derive(Debug, Clone, PartialEq)]
pub struct LendingProtocol {
    pub name: String,
    pub pool: Address,
    /// Unit the pool reports collateral and debt in.
    pub base_currency: String,
}

/// DEX venue quoted through a Uniswap V2 compatible router.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub name: String,
    pub router: Address,
}
