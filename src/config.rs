// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads settings from environment variables.

use alloy::primitives::Address;
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::orchestrator::{OrchestratorSettings, StopMode};
use crate::rules::{self, ClassificationRules, DEFAULT_PROTOCOLS, DEFAULT_SELECTORS};
use crate::sources::dex::{SUSHISWAP_ROUTER, UNISWAP_V2_ROUTER};
use crate::types::{LendingProtocol, TokenPair, Venue};
use crate::valuation::{CloseFactorBonus, NotionalCostModel};

const DEFAULT_TOKEN_PAIRS: &str = "ETH/USDC:0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2:18:0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48:6,\
WBTC/ETH:0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599:8:0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2:18,\
DAI/USDC:0x6B175474E89094C44Da98b954EedeAC495271d0F:18:0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48:6";

const DEFAULT_LENDING_PROTOCOLS: &str = "Aave=0x7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9:ETH";

/// Main configuration for the scanner.
#[derive(Debug, Clone)]
pub struct Config {
    // RPC
    pub rpc_url: String,

    // Scheduling
    pub scan_interval_sec: u64,
    pub error_backoff_sec: u64,
    pub immediate_stop: bool,

    // Classification
    pub protocol_registry: Vec<(String, Address)>,
    pub selectors: Vec<(String, [u8; 4])>,

    // Arbitrage
    pub min_spread_pct: f64,
    pub venues: Vec<Venue>,
    pub token_pairs: Vec<TokenPair>,
    pub arb_notional_usd: f64,
    pub arb_fee_pct: f64,

    // Liquidations
    pub lending_protocols: Vec<LendingProtocol>,
    pub liquidation_watchlist: Vec<Address>,
    pub liq_close_factor: f64,
    pub liq_bonus_pct: f64,

    // Notifications
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let default_protocols = join_named(DEFAULT_PROTOCOLS);
        let default_selectors = join_named(DEFAULT_SELECTORS);
        let default_venues = format!("Uniswap={},SushiSwap={}", UNISWAP_V2_ROUTER, SUSHISWAP_ROUTER);

        let config = Self {
            // RPC
            rpc_url: env.required("ETH_RPC_URL")?,

            // Scheduling
            scan_interval_sec: env.parse_or("SCAN_INTERVAL_SEC", 30)?,
            error_backoff_sec: env.parse_or("ERROR_BACKOFF_SEC", 60)?,
            immediate_stop: env.parse_or("IMMEDIATE_STOP", false)?,

            // Classification
            protocol_registry: parse_named_list("PROTOCOL_REGISTRY", &env.or("PROTOCOL_REGISTRY", &default_protocols), |s| {
                rules::parse_address(s)
            })?,
            selectors: parse_named_list("DEFI_SELECTORS", &env.or("DEFI_SELECTORS", &default_selectors), |s| {
                rules::parse_selector(s)
            })?,

            // Arbitrage
            min_spread_pct: env.parse_or("MIN_SPREAD_PCT", crate::scanners::DEFAULT_MIN_SPREAD_PCT)?,
            venues: parse_named_list("DEX_VENUES", &env.or("DEX_VENUES", &default_venues), |s| {
                rules::parse_address(s)
            })?
            .into_iter()
            .map(|(name, router)| Venue { name, router })
            .collect(),
            token_pairs: parse_token_pairs(&env.or("TOKEN_PAIRS", DEFAULT_TOKEN_PAIRS))?,
            arb_notional_usd: env.parse_or("ARB_NOTIONAL_USD", 10_000.0)?,
            arb_fee_pct: env.parse_or("ARB_FEE_PCT", 0.3)?,

            // Liquidations
            lending_protocols: parse_lending_protocols(&env.or("LENDING_PROTOCOLS", DEFAULT_LENDING_PROTOCOLS))?,
            liquidation_watchlist: split_list(&env.or("LIQUIDATION_WATCHLIST", ""))
                .map(rules::parse_address)
                .collect::<Result<_, _>>()?,
            liq_close_factor: env.parse_or("LIQ_CLOSE_FACTOR", 0.5)?,
            liq_bonus_pct: env.parse_or("LIQ_BONUS_PCT", 5.0)?,

            // Notifications
            telegram_token: env.optional("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: env.optional("TELEGRAM_CHAT_ID"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the scanner can't run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::Missing("ETH_RPC_URL".into()));
        }
        if self.scan_interval_sec == 0 {
            return Err(ConfigError::invalid("SCAN_INTERVAL_SEC", "must be positive"));
        }
        if self.error_backoff_sec == 0 {
            return Err(ConfigError::invalid("ERROR_BACKOFF_SEC", "must be positive"));
        }
        if !(self.min_spread_pct.is_finite() && self.min_spread_pct >= 0.0) {
            return Err(ConfigError::invalid("MIN_SPREAD_PCT", "must be a non-negative number"));
        }
        if self.protocol_registry.is_empty() {
            return Err(ConfigError::Empty("protocol registry"));
        }
        if self.selectors.is_empty() {
            return Err(ConfigError::Empty("selector registry"));
        }

        let mut seen = HashSet::new();
        for pair in &self.token_pairs {
            if !seen.insert(pair.name.as_str()) {
                return Err(ConfigError::invalid("TOKEN_PAIRS", format!("duplicate pair {}", pair.name)));
            }
        }

        let mut seen = HashSet::new();
        for venue in &self.venues {
            if !seen.insert(venue.name.as_str()) {
                return Err(ConfigError::invalid("DEX_VENUES", format!("duplicate venue {}", venue.name)));
            }
        }

        Ok(())
    }

    pub fn classification_rules(&self) -> Result<ClassificationRules, ConfigError> {
        let rules = ClassificationRules::new(self.protocol_registry.clone(), self.selectors.clone());
        rules.validate()?;
        Ok(rules)
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            poll_interval: Duration::from_secs(self.scan_interval_sec),
            error_backoff: Duration::from_secs(self.error_backoff_sec),
            stop_mode: if self.immediate_stop {
                StopMode::Immediate
            } else {
                StopMode::Graceful
            },
        }
    }

    pub fn cost_model(&self) -> NotionalCostModel {
        NotionalCostModel {
            notional_usd: self.arb_notional_usd,
            fee_pct_per_leg: self.arb_fee_pct,
        }
    }

    pub fn liquidation_valuation(&self) -> CloseFactorBonus {
        CloseFactorBonus {
            close_factor: self.liq_close_factor,
            bonus_pct: self.liq_bonus_pct,
        }
    }

    pub fn venue_names(&self) -> Vec<String> {
        self.venues.iter().map(|v| v.name.clone()).collect()
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::invalid(name, e)),
            None => Ok(default),
        }
    }
}

fn join_named(table: &[(&str, &str)]) -> String {
    table
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(",")
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Parse `name=value,name=value`.
fn parse_named_list<T>(
    var: &str,
    raw: &str,
    parse: impl Fn(&str) -> Result<T, ConfigError>,
) -> Result<Vec<(String, T)>, ConfigError> {
    split_list(raw)
        .map(|entry| {
            let (name, value) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::invalid(var, format!("expected name=value, got {}", entry)))?;
            Ok((name.trim().to_string(), parse(value)?))
        })
        .collect()
}

/// Parse `NAME:base:decimals:quote:decimals,...`.
fn parse_token_pairs(raw: &str) -> Result<Vec<TokenPair>, ConfigError> {
    split_list(raw)
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let [name, base, base_decimals, quote, quote_decimals] = parts[..] else {
                return Err(ConfigError::invalid(
                    "TOKEN_PAIRS",
                    format!("expected NAME:base:decimals:quote:decimals, got {}", entry),
                ));
            };
            Ok(TokenPair {
                name: name.to_string(),
                base: rules::parse_address(base)?,
                base_decimals: base_decimals
                    .parse()
                    .map_err(|e| ConfigError::invalid("TOKEN_PAIRS", e))?,
                quote: rules::parse_address(quote)?,
                quote_decimals: quote_decimals
                    .parse()
                    .map_err(|e| ConfigError::invalid("TOKEN_PAIRS", e))?,
            })
        })
        .collect()
}

/// Parse `name=pool[:currency],...`; currency defaults to ETH.
fn parse_lending_protocols(raw: &str) -> Result<Vec<LendingProtocol>, ConfigError> {
    parse_named_list("LENDING_PROTOCOLS", raw, |value| {
        let (pool, currency) = value.split_once(':').unwrap_or((value, "ETH"));
        Ok((rules::parse_address(pool)?, currency.trim().to_string()))
    })
    .map(|entries| {
        entries
            .into_iter()
            .map(|(name, (pool, base_currency))| LendingProtocol {
                name,
                pool,
                base_currency,
            })
            .collect()
    })
}
