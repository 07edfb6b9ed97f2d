// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! DeFi Scanner - mempool, liquidation, arbitrage and gas monitoring.

use anyhow::Context;
use clap::Parser;
use defi_scanner::rpc::create_provider;
use defi_scanner::scanners::{ArbitrageScanner, LiquidationScanner};
use defi_scanner::sink::JsonStdoutSink;
use defi_scanner::sources::{AavePoolClient, DexQuoter, NodeClient};
use defi_scanner::telegram::TelegramSink;
use defi_scanner::{Config, ScanOrchestrator, Sources, TransactionClassifier};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "defi-scanner", about = "Monitor mempool, liquidations, arbitrage and gas")]
struct Cli {
    /// Run a single scan cycle and exit.
    #[arg(long)]
    once: bool,

    /// Seconds between scan cycles (overrides SCAN_INTERVAL_SEC).
    #[arg(long)]
    interval: Option<u64>,

    /// Seconds to back off after a failed cycle (overrides ERROR_BACKOFF_SEC).
    #[arg(long)]
    backoff: Option<u64>,

    /// Minimum arbitrage spread in percent (overrides MIN_SPREAD_PCT).
    #[arg(long)]
    min_spread: Option<f64>,

    /// Abandon an in-flight cycle on Ctrl-C instead of letting it finish.
    #[arg(long)]
    immediate_stop: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(interval) = cli.interval {
        config.scan_interval_sec = interval;
    }
    if let Some(backoff) = cli.backoff {
        config.error_backoff_sec = backoff;
    }
    if let Some(min_spread) = cli.min_spread {
        config.min_spread_pct = min_spread;
    }
    config.immediate_stop |= cli.immediate_stop;
    config.validate().context("invalid command line override")?;

    info!("🚀 DeFi Scanner starting...");
    info!("📡 RPC: {}", config.rpc_url);
    info!(
        "📊 {} pairs on {} venues, min spread {}%",
        config.token_pairs.len(),
        config.venues.len(),
        config.min_spread_pct
    );
    info!(
        "🏦 {} lending protocols, {} watched borrowers",
        config.lending_protocols.len(),
        config.liquidation_watchlist.len()
    );
    if config.liquidation_watchlist.is_empty() {
        warn!("LIQUIDATION_WATCHLIST is empty, liquidation scan will find nothing");
    }

    let provider = create_provider(&config.rpc_url)?;
    let node = NodeClient::new(provider.clone());
    let sources = Sources {
        mempool: node.clone(),
        lending: AavePoolClient::new(provider.clone(), config.liquidation_watchlist.clone()),
        prices: DexQuoter::new(provider, config.venues.clone()),
        gas: node,
    };

    let orchestrator = ScanOrchestrator::new(
        sources,
        TransactionClassifier::new(Arc::new(config.classification_rules()?)),
        LiquidationScanner::new(
            config.lending_protocols.clone(),
            Arc::new(config.liquidation_valuation()),
        ),
        ArbitrageScanner::new(
            config.venue_names(),
            config.token_pairs.clone(),
            config.min_spread_pct,
            Arc::new(config.cost_model()),
        ),
        config.orchestrator_settings(),
    );

    let telegram = TelegramSink::new(config.telegram_token.clone(), config.telegram_chat_id.clone());
    if let Some(telegram) = &telegram {
        telegram.send_message("🚀 DeFi Scanner launching...").await;
    }
    let sink = (JsonStdoutSink, telegram);

    if cli.once {
        // Only configuration errors end the process with a failure.
        match orchestrator.run_cycle(&sink).await {
            Ok(report) => {
                for (scan, e) in &report.failures {
                    warn!("⚠️ {} scan contributed nothing: {}", scan, e);
                }
            }
            Err(e) => error!("❌ Error in scan cycle: {}", e),
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("🛑 Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Dropping the sender would stop the scanner, keep it alive.
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    orchestrator.run(&sink, shutdown_rx).await;
    Ok(())
}
