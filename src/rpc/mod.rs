// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! RPC connection to the Ethereum node.

mod provider;

pub use provider::create_provider;
