// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Upstream data sources consumed by the scanners.

pub mod dex;
pub mod lending;
pub mod node;

use std::future::Future;

use crate::error::FetchError;
use crate::types::{AccountPosition, LendingProtocol, PriceQuote, RawTransaction, TokenPair};

pub use dex::DexQuoter;
pub use lending::AavePoolClient;
pub use node::NodeClient;

pub trait MempoolSource: Send + Sync {
    /// All currently pending transactions, in node order.
    fn fetch_pending_transactions(
        &self,
    ) -> impl Future<Output = Result<Vec<RawTransaction>, FetchError>> + Send;
}

pub trait LendingSource: Send + Sync {
    fn fetch_account_health(
        &self,
        protocol: &LendingProtocol,
    ) -> impl Future<Output = Result<Vec<AccountPosition>, FetchError>> + Send;
}

pub trait PriceSource: Send + Sync {
    fn fetch_quote(
        &self,
        venue: &str,
        pair: &TokenPair,
    ) -> impl Future<Output = Result<PriceQuote, FetchError>> + Send;
}

pub trait GasSource: Send + Sync {
    /// Current network gas price in gwei.
    fn fetch_base_gas_price(&self) -> impl Future<Output = Result<f64, FetchError>> + Send;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::HashMap;

    pub struct FakeMempool(pub Result<Vec<RawTransaction>, FetchError>);

    impl MempoolSource for FakeMempool {
        async fn fetch_pending_transactions(&self) -> Result<Vec<RawTransaction>, FetchError> {
            self.0.clone()
        }
    }

    /// Positions keyed by protocol name; unknown protocols fail.
    #[derive(Default)]
    pub struct FakeLending(pub HashMap<String, Result<Vec<AccountPosition>, FetchError>>);

    impl LendingSource for FakeLending {
        async fn fetch_account_health(
            &self,
            protocol: &LendingProtocol,
        ) -> Result<Vec<AccountPosition>, FetchError> {
            self.0
                .get(&protocol.name)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Rpc(format!("no data for {}", protocol.name))))
        }
    }

    /// Prices keyed by (venue, pair name); missing entries fail.
    #[derive(Default)]
    pub struct FakePrices(pub HashMap<(String, String), f64>);

    impl FakePrices {
        pub fn with(mut self, venue: &str, pair: &str, price: f64) -> Self {
            self.0.insert((venue.to_string(), pair.to_string()), price);
            self
        }
    }

    impl PriceSource for FakePrices {
        async fn fetch_quote(&self, venue: &str, pair: &TokenPair) -> Result<PriceQuote, FetchError> {
            match self.0.get(&(venue.to_string(), pair.name.clone())) {
                Some(price) => Ok(PriceQuote {
                    venue: venue.to_string(),
                    pair: pair.name.clone(),
                    price: *price,
                }),
                None => Err(FetchError::UnknownVenue(venue.to_string())),
            }
        }
    }

    pub struct FakeGas(pub Result<f64, FetchError>);

    impl GasSource for FakeGas {
        async fn fetch_base_gas_price(&self) -> Result<f64, FetchError> {
            self.0.clone()
        }
    }
}
