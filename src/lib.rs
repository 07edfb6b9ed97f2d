// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! DeFi scanner - polls node and DEX sources, derives mempool, liquidation,
//! arbitrage and gas signals every cycle.

pub mod classifier;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod rpc;
pub mod rules;
pub mod scanners;
pub mod sink;
pub mod sources;
pub mod telegram;
pub mod types;
pub mod valuation;

pub use classifier::TransactionClassifier;
pub use config::Config;
pub use error::{ConfigError, CycleError, FetchError, SinkError};
pub use orchestrator::{OrchestratorSettings, ScanOrchestrator, Sources, StopMode};
pub use rules::ClassificationRules;
pub use types::ScanSnapshot;
