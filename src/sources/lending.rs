// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Aave-style lending pool account reader.

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use alloy::providers::DynProvider;
use alloy::sol;
use futures_util::future::join_all;
use tracing::{debug, warn};

use super::LendingSource;
use crate::error::FetchError;
use crate::types::{AccountPosition, LendingProtocol};

/// Pool reports collateral and debt with 18 decimals.
const BASE_DECIMALS: u8 = 18;

/// Liquidation threshold is reported in basis points.
const BPS_DENOMINATOR: f64 = 10_000.0;

sol! {
    #[sol(rpc)]
    interface ILendingPool {
        function getUserAccountData(address user)
            external view returns (
                uint256 totalCollateralETH,
                uint256 totalDebtETH,
                uint256 availableBorrowsETH,
                uint256 currentLiquidationThreshold,
                uint256 ltv,
                uint256 healthFactor
            );
    }
}

/// Reads account data for a fixed borrower watchlist.
#[derive(Clone)]
pub struct AavePoolClient {
    provider: DynProvider,
    watchlist: Vec<Address>,
}

impl AavePoolClient {
    pub fn new(provider: DynProvider, watchlist: Vec<Address>) -> Self {
        Self { provider, watchlist }
    }

    async fn account(
        &self,
        protocol: &LendingProtocol,
        borrower: Address,
    ) -> Result<AccountPosition, FetchError> {
        let pool = ILendingPool::new(protocol.pool, &self.provider);
        let data = pool
            .getUserAccountData(borrower)
            .call()
            .await
            .map_err(|e| FetchError::Rpc(format!("{} getUserAccountData failed: {}", protocol.name, e)))?;

        Ok(AccountPosition {
            borrower,
            collateral_value: units_to_f64(data.totalCollateralETH, BASE_DECIMALS)?,
            debt_value: units_to_f64(data.totalDebtETH, BASE_DECIMALS)?,
            liquidation_threshold: bps_to_fraction(data.currentLiquidationThreshold)?,
            collateral_asset: protocol.base_currency.clone(),
            debt_asset: protocol.base_currency.clone(),
        })
    }
}

impl LendingSource for AavePoolClient {
    async fn fetch_account_health(
        &self,
        protocol: &LendingProtocol,
    ) -> Result<Vec<AccountPosition>, FetchError> {
        let results = join_all(
            self.watchlist
                .iter()
                .map(|borrower| self.account(protocol, *borrower)),
        )
        .await;

        let accounts = keep_readable(&protocol.name, self.watchlist.iter().copied().zip(results))?;
        debug!("{}: read {} accounts", protocol.name, accounts.len());
        Ok(accounts)
    }
}

/// Keep every account that could be read. Errors only when every read failed.
fn keep_readable(
    protocol: &str,
    results: impl IntoIterator<Item = (Address, Result<AccountPosition, FetchError>)>,
) -> Result<Vec<AccountPosition>, FetchError> {
    let mut accounts = Vec::new();
    let mut failed = 0;
    for (borrower, result) in results {
        match result {
            Ok(account) => accounts.push(account),
            Err(e) => {
                warn!("{}: failed to read account {}: {}", protocol, borrower, e);
                failed += 1;
            }
        }
    }

    if failed > 0 && accounts.is_empty() {
        return Err(FetchError::AllFailed(failed));
    }
    Ok(accounts)
}

pub fn units_to_f64(value: U256, decimals: u8) -> Result<f64, FetchError> {
    format_units(value, decimals)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?
        .parse::<f64>()
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))
}

fn bps_to_fraction(bps: U256) -> Result<f64, FetchError> {
    let bps: u64 = bps
        .try_into()
        .map_err(|_| FetchError::MalformedResponse(format!("threshold {} out of range", bps)))?;
    Ok(bps as f64 / BPS_DENOMINATOR)
}
