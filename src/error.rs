// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error types shared by the scanner.

use thiserror::Error;

/// Failure of a single upstream call. Recovered inside the sub-scan that owns it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("rpc call failed: {0}")]
    Rpc(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("unknown venue {0}")]
    UnknownVenue(String),
    #[error("no pending block available")]
    NoPendingBlock,
    #[error("all {0} upstream queries failed")]
    AllFailed(usize),
    #[error("sub-scan panicked: {0}")]
    Panicked(String),
}

/// Invalid or missing configuration. Fatal at startup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(String),
    #[error("invalid {name}: {reason}")]
    Invalid { name: String, reason: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

impl ConfigError {
    pub fn invalid(name: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Snapshot delivery failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SinkError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(String),
    #[error("failed to deliver snapshot: {0}")]
    Delivery(String),
}

/// Unexpected failure outside the sub-scan boundaries.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CycleError {
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("scan cycle panicked: {0}")]
    Panicked(String),
}
