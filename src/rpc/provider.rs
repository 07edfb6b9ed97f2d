// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only provider setup.

use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    transports::http::reqwest::Url,
};

use crate::error::ConfigError;

/// Create an HTTP provider without a signer. One provider is shared by every source so
/// requests within a cycle reuse the same connection pool.
pub fn create_provider(rpc_url: &str) -> Result<DynProvider, ConfigError> {
    let url: Url = rpc_url
        .parse()
        .map_err(|e| ConfigError::invalid("ETH_RPC_URL", e))?;

    Ok(ProviderBuilder::new().connect_http(url).erased())
}
