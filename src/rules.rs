// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Protocol address and function selector registries.

use alloy::primitives::{hex, Address};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::error::ConfigError;

/// Well-known DeFi protocol contracts on Ethereum mainnet.
pub const DEFAULT_PROTOCOLS: &[(&str, &str)] = &[
    ("uniswap_v3_factory", "0x1F98431c8aD98523631AE4a59f267346ea31F984"),
    ("aave_lending_pool", "0x7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9"),
    ("compound_comptroller", "0x3d9819210A31b4961b30EF54bE2aeD79B9c9Cd3B"),
    ("curve_registry", "0x90E00ACe148ca3b23Ac1bC8C240C2a7Dd9c2d7f5"),
    ("balancer_vault", "0xBA12222222228d8Ba445958a75a0704d566BF2C8"),
];

/// Function selectors that mark a call as DeFi activity.
pub const DEFAULT_SELECTORS: &[(&str, &str)] = &[
    ("transfer", "0xa9059cbb"),
    ("approve", "0x095ea7b3"),
    ("swapExactTokensForTokens", "0x38ed1739"),
    ("swapExactETHForTokens", "0x7ff36ab5"),
    ("swapExactTokensForETH", "0x18cbafe5"),
    ("swap", "0x022c0d9f"),
    ("mint", "0x128acb08"),
    ("burn", "0x0c49ccbe"),
];

/// Immutable lookup tables used by the transaction classifier.
#[derive(Debug, Clone, Default)]
pub struct ClassificationRules {
    protocols: HashMap<Address, String>,
    selectors: HashMap<[u8; 4], String>,
}

impl ClassificationRules {
    pub fn new(
        protocols: impl IntoIterator<Item = (String, Address)>,
        selectors: impl IntoIterator<Item = (String, [u8; 4])>,
    ) -> Self {
        Self {
            protocols: protocols.into_iter().map(|(name, addr)| (addr, name)).collect(),
            selectors: selectors.into_iter().map(|(name, sel)| (sel, name)).collect(),
        }
    }

    /// Build from `(name, hex)` tables. Addresses are parsed case-insensitively.
    pub fn from_tables(
        protocols: &[(&str, &str)],
        selectors: &[(&str, &str)],
    ) -> Result<Self, ConfigError> {
        let protocols = protocols
            .iter()
            .map(|(name, addr)| Ok((name.to_string(), parse_address(addr)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let selectors = selectors
            .iter()
            .map(|(name, sel)| Ok((name.to_string(), parse_selector(sel)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let rules = Self::new(protocols, selectors);
        rules.validate()?;
        Ok(rules)
    }

    /// Mainnet defaults.
    pub fn mainnet() -> Result<Self, ConfigError> {
        Self::from_tables(DEFAULT_PROTOCOLS, DEFAULT_SELECTORS)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocols.is_empty() {
            return Err(ConfigError::Empty("protocol registry"));
        }
        if self.selectors.is_empty() {
            return Err(ConfigError::Empty("selector registry"));
        }
        Ok(())
    }

    /// Registered protocol name for an address.
    pub fn protocol(&self, address: &Address) -> Option<&str> {
        self.protocols.get(address).map(String::as_str)
    }

    /// Registered function name for a selector.
    pub fn function(&self, selector: &[u8; 4]) -> Option<&str> {
        self.selectors.get(selector).map(String::as_str)
    }

    pub fn protocol_addresses(&self) -> HashSet<Address> {
        self.protocols.keys().copied().collect()
    }
}

pub fn parse_address(s: &str) -> Result<Address, ConfigError> {
    Address::from_str(s.trim()).map_err(|e| ConfigError::invalid(&format!("address {}", s), e))
}

pub fn parse_selector(s: &str) -> Result<[u8; 4], ConfigError> {
    let bytes = hex::decode(s.trim()).map_err(|e| ConfigError::invalid(&format!("selector {}", s), e))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| ConfigError::invalid(&format!("selector {}", s), "expected 4 bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_tables_parse() {
        let rules = ClassificationRules::mainnet().unwrap();
        assert_eq!(rules.protocol_addresses().len(), DEFAULT_PROTOCOLS.len());
        assert_eq!(rules.function(&[0xa9, 0x05, 0x9c, 0xbb]), Some("transfer"));
    }

    #[test]
    fn address_lookup_ignores_case() {
        let rules = ClassificationRules::mainnet().unwrap();
        let lower = parse_address("0xba12222222228d8ba445958a75a0704d566bf2c8").unwrap();
        let upper = parse_address("0xBA12222222228D8BA445958A75A0704D566BF2C8").unwrap();
        assert_eq!(rules.protocol(&lower), Some("balancer_vault"));
        assert_eq!(rules.protocol(&upper), Some("balancer_vault"));
    }

    #[test]
    fn selector_must_be_four_bytes() {
        assert!(parse_selector("0xa9059c").is_err());
        assert!(parse_selector("0xzz059cbb").is_err());
        assert_eq!(parse_selector("095ea7b3").unwrap(), [0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn empty_registry_is_rejected() {
        let err = ClassificationRules::from_tables(&[], DEFAULT_SELECTORS).unwrap_err();
        assert_eq!(err, ConfigError::Empty("protocol registry"));
    }
}
