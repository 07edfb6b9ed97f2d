// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! DEX price feed through Uniswap V2 compatible routers.

use alloy::primitives::U256;
use alloy::providers::DynProvider;
use alloy::sol;
use std::collections::HashMap;

use super::lending::units_to_f64;
use super::PriceSource;
use crate::error::FetchError;
use crate::types::{PriceQuote, TokenPair, Venue};

/// Uniswap V2 Router02 on Ethereum mainnet.
pub const UNISWAP_V2_ROUTER: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";

/// SushiSwap router on Ethereum mainnet.
pub const SUSHISWAP_ROUTER: &str = "0xd9e1cE17f2641f24aE83637ab66a2cca9C378B9F";

sol! {
    #[sol(rpc)]
    interface IUniswapV2Router {
        function getAmountsOut(uint256 amountIn, address[] calldata path)
            external view returns (uint256[] memory amounts);
    }
}

/// Quotes one whole base token against each venue's router.
#[derive(Clone)]
pub struct DexQuoter {
    provider: DynProvider,
    routers: HashMap<String, Venue>,
}

impl DexQuoter {
    pub fn new(provider: DynProvider, venues: Vec<Venue>) -> Self {
        let routers = venues.into_iter().map(|v| (v.name.clone(), v)).collect();
        Self { provider, routers }
    }
}

impl PriceSource for DexQuoter {
    async fn fetch_quote(&self, venue: &str, pair: &TokenPair) -> Result<PriceQuote, FetchError> {
        let router = self
            .routers
            .get(venue)
            .ok_or_else(|| FetchError::UnknownVenue(venue.to_string()))?;

        let contract = IUniswapV2Router::new(router.router, &self.provider);
        let amount_in = U256::from(10u64).pow(U256::from(pair.base_decimals));
        let path = vec![pair.base, pair.quote];

        let amounts = contract
            .getAmountsOut(amount_in, path)
            .call()
            .await
            .map_err(|e| FetchError::Rpc(format!("{} getAmountsOut failed: {}", venue, e)))?;

        if amounts.len() < 2 {
            return Err(FetchError::MalformedResponse(format!(
                "{} returned {} amounts",
                venue,
                amounts.len()
            )));
        }

        Ok(PriceQuote {
            venue: venue.to_string(),
            pair: pair.name.clone(),
            price: units_to_f64(amounts[1], pair.quote_decimals)?,
        })
    }
}
