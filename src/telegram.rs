// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Telegram notifications for scan findings.

use std::fmt::Write;
use teloxide::prelude::*;
use tracing::{error, info, warn};

use crate::error::SinkError;
use crate::sink::SnapshotSink;
use crate::types::ScanSnapshot;

#[derive(Clone)]
pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSink {
    /// Returns `None` unless both token and a numeric chat id are configured.
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Option<Self> {
        info!(
            "📱 Initializing Telegram: token={}, chat_id={}",
            token.as_ref().map(|_| "SET").unwrap_or("NONE"),
            chat_id.as_ref().map(|_| "SET").unwrap_or("NONE")
        );

        let chat_id = match chat_id?.parse::<i64>() {
            Ok(id) => ChatId(id),
            Err(e) => {
                warn!("Invalid TELEGRAM_CHAT_ID, notifications disabled: {}", e);
                return None;
            }
        };

        Some(Self {
            bot: Bot::new(token?),
            chat_id,
        })
    }

    pub async fn send_message(&self, message: &str) {
        match self.bot.send_message(self.chat_id, message).await {
            Ok(_) => info!("📤 Sent Telegram message"),
            Err(e) => error!("Failed to send Telegram message: {}", e),
        }
    }
}

impl SnapshotSink for TelegramSink {
    // Best effort: a Telegram outage must not slow down scanning.
    async fn emit(&self, snapshot: &ScanSnapshot) -> Result<(), SinkError> {
        if let Some(message) = summarize(snapshot) {
            self.send_message(&message).await;
        }
        Ok(())
    }
}

/// Human-readable summary of the actionable findings, if there are any.
pub fn summarize(snapshot: &ScanSnapshot) -> Option<String> {
    if !snapshot.has_findings() {
        return None;
    }

    let mut msg = format!("🔍 Scan {}\n", snapshot.timestamp.format("%H:%M:%S"));

    for opp in &snapshot.arbitrage_opportunities {
        let _ = writeln!(
            msg,
            "💰 {}: buy {} @ {:.4}, sell {} @ {:.4} ({:.3}%, est. ${:.2})",
            opp.pair,
            opp.buy_venue,
            opp.buy_price,
            opp.sell_venue,
            opp.sell_price,
            opp.spread_percent,
            opp.estimated_profit
        );
    }

    for liq in &snapshot.liquidation_opportunities {
        let _ = writeln!(
            msg,
            "💧 {}: {:?} HF {:.3} ({} / {}, est. {:.4})",
            liq.protocol,
            liq.borrower,
            liq.health_factor,
            liq.collateral_asset,
            liq.debt_asset,
            liq.estimated_profit
        );
    }

    if let Some(gas) = &snapshot.gas_tiers {
        let _ = writeln!(
            msg,
            "⛽ {:.1} / {:.1} / {:.1} / {:.1} gwei",
            gas.slow, gas.standard, gas.fast, gas.instant
        );
    }

    Some(msg)
}
