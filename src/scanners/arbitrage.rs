// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cross-venue price spread detection.

use chrono::Utc;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::sources::PriceSource;
use crate::types::{ArbitrageOpportunity, PriceQuote, TokenPair};
use crate::valuation::ArbitrageCostModel;

/// Minimum spread (0.1%) below which a price difference is noise.
pub const DEFAULT_MIN_SPREAD_PCT: f64 = 0.1;

/// Quotes per venue, then per pair name. Venue order is lexicographic.
pub type VenueQuotes = BTreeMap<String, BTreeMap<String, PriceQuote>>;

/// Compare each requested pair across venues and keep spreads above `min_spread_percent`.
///
/// When several venues share the lowest or highest price, the first venue by
/// name wins. A non-finite or negative minimum matches nothing.
pub fn detect_arbitrage(
    venue_quotes: &VenueQuotes,
    pairs: &[String],
    min_spread_percent: f64,
    cost_model: &dyn ArbitrageCostModel,
) -> Vec<ArbitrageOpportunity> {
    if !min_spread_percent.is_finite() || min_spread_percent < 0.0 {
        warn!("Invalid minimum spread {}, skipping arbitrage detection", min_spread_percent);
        return Vec::new();
    }

    let observed_at = Utc::now();
    let mut opportunities = Vec::new();

    for pair in pairs {
        let quotes: Vec<&PriceQuote> = venue_quotes
            .values()
            .filter_map(|by_pair| by_pair.get(pair))
            .filter(|q| q.is_valid())
            .collect();

        if quotes.len() < 2 {
            debug!("{}: only {} valid quotes, skipping", pair, quotes.len());
            continue;
        }

        let mut low = quotes[0];
        let mut high = quotes[0];
        for quote in &quotes[1..] {
            if quote.price < low.price {
                low = quote;
            }
            if quote.price > high.price {
                high = quote;
            }
        }

        let spread_percent = (high.price - low.price) / low.price * 100.0;
        if spread_percent <= min_spread_percent {
            debug!("No arb for {} ({:.4}%)", pair, spread_percent);
            continue;
        }

        info!(
            "💰 ARB FOUND: {} - Buy on {} @ {}, Sell on {} @ {} - Spread: {:.4}%",
            pair, low.venue, low.price, high.venue, high.price, spread_percent
        );

        opportunities.push(ArbitrageOpportunity {
            pair: pair.clone(),
            buy_venue: low.venue.clone(),
            sell_venue: high.venue.clone(),
            buy_price: low.price,
            sell_price: high.price,
            spread_percent,
            estimated_profit: cost_model.estimate_profit(low.price, high.price),
            observed_at,
        });
    }

    opportunities
}

/// Fetches quotes for every venue and pair, then runs [`detect_arbitrage`].
pub struct ArbitrageScanner {
    venues: Vec<String>,
    pairs: Vec<TokenPair>,
    min_spread_percent: f64,
    cost_model: Arc<dyn ArbitrageCostModel>,
}

impl ArbitrageScanner {
    pub fn new(
        venues: Vec<String>,
        pairs: Vec<TokenPair>,
        min_spread_percent: f64,
        cost_model: Arc<dyn ArbitrageCostModel>,
    ) -> Self {
        Self {
            venues,
            pairs,
            min_spread_percent,
            cost_model,
        }
    }

    /// Errors only when every quote failed.
    pub async fn scan<S: PriceSource>(
        &self,
        source: &S,
    ) -> Result<Vec<ArbitrageOpportunity>, FetchError> {
        let requests: Vec<(&str, &TokenPair)> = self
            .venues
            .iter()
            .flat_map(|venue| self.pairs.iter().map(move |pair| (venue.as_str(), pair)))
            .collect();

        let results = join_all(
            requests
                .iter()
                .map(|(venue, pair)| source.fetch_quote(venue, pair)),
        )
        .await;

        let mut venue_quotes = VenueQuotes::new();
        let mut failed = 0;
        for ((venue, pair), result) in requests.iter().zip(results) {
            match result {
                Ok(quote) => {
                    venue_quotes
                        .entry(venue.to_string())
                        .or_default()
                        .insert(pair.name.clone(), quote);
                }
                Err(e) => {
                    warn!("Failed to quote {} on {}: {}", pair.name, venue, e);
                    failed += 1;
                }
            }
        }

        if failed > 0 && failed == requests.len() {
            return Err(FetchError::AllFailed(failed));
        }

        let pair_names: Vec<String> = self.pairs.iter().map(|p| p.name.clone()).collect();
        let opportunities = detect_arbitrage(
            &venue_quotes,
            &pair_names,
            self.min_spread_percent,
            self.cost_model.as_ref(),
        );

        info!("Found {} arbitrage opportunities", opportunities.len());
        Ok(opportunities)
    }
}
