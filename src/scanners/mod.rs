// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sub-scans run by the orchestrator each cycle.

pub mod arbitrage;
pub mod gas;
pub mod liquidation;
pub mod mempool;

pub use arbitrage::{detect_arbitrage, ArbitrageScanner, VenueQuotes, DEFAULT_MIN_SPREAD_PCT};
pub use gas::{compute_tiers, scan_gas, GasTier};
pub use liquidation::{health_factor, LiquidationScanner, LIQUIDATION_BOUNDARY};
pub use mempool::scan_mempool;
