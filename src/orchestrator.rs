// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Scan loop: fan out the sub-scans, assemble a snapshot, emit, sleep.

use chrono::Utc;
use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::classifier::TransactionClassifier;
use crate::error::{CycleError, FetchError};
use crate::scanners::{scan_gas, scan_mempool, ArbitrageScanner, LiquidationScanner};
use crate::sink::SnapshotSink;
use crate::sources::{GasSource, LendingSource, MempoolSource, PriceSource};
use crate::types::ScanSnapshot;

/// How a shutdown request treats a cycle that is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopMode {
    /// Let the running cycle finish and emit, stop before the next one.
    #[default]
    Graceful,
    /// Drop the running cycle and discard its results.
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Scanning,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorSettings {
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub stop_mode: StopMode,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            error_backoff: Duration::from_secs(60),
            stop_mode: StopMode::Graceful,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubScan {
    Mempool,
    Liquidations,
    Arbitrage,
    Gas,
}

impl fmt::Display for SubScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubScan::Mempool => write!(f, "mempool"),
            SubScan::Liquidations => write!(f, "liquidations"),
            SubScan::Arbitrage => write!(f, "arbitrage"),
            SubScan::Gas => write!(f, "gas"),
        }
    }
}

/// Snapshot of one cycle plus the sub-scans that contributed nothing because they failed.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub snapshot: ScanSnapshot,
    pub failures: Vec<(SubScan, FetchError)>,
}

/// Upstream sources, one per sub-scan.
pub struct Sources<M, L, P, G> {
    pub mempool: M,
    pub lending: L,
    pub prices: P,
    pub gas: G,
}

pub struct ScanOrchestrator<M, L, P, G> {
    sources: Sources<M, L, P, G>,
    classifier: TransactionClassifier,
    liquidations: LiquidationScanner,
    arbitrage: ArbitrageScanner,
    settings: OrchestratorSettings,
    state: watch::Sender<ScannerState>,
}

impl<M, L, P, G> ScanOrchestrator<M, L, P, G>
where
    M: MempoolSource,
    L: LendingSource,
    P: PriceSource,
    G: GasSource,
{
    pub fn new(
        sources: Sources<M, L, P, G>,
        classifier: TransactionClassifier,
        liquidations: LiquidationScanner,
        arbitrage: ArbitrageScanner,
        settings: OrchestratorSettings,
    ) -> Self {
        let (state, _) = watch::channel(ScannerState::Idle);
        Self {
            sources,
            classifier,
            liquidations,
            arbitrage,
            settings,
            state,
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Observe Idle/Scanning transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ScannerState> {
        self.state.subscribe()
    }

    /// Run all four sub-scans concurrently and assemble the snapshot.
    pub async fn collect(&self) -> CycleReport {
        let (mempool, liquidations, arbitrage, gas) = tokio::join!(
            isolated(scan_mempool(&self.sources.mempool, &self.classifier)),
            isolated(self.liquidations.scan(&self.sources.lending)),
            isolated(self.arbitrage.scan(&self.sources.prices)),
            isolated(scan_gas(&self.sources.gas)),
        );

        let mut failures = Vec::new();
        let mempool_transactions = absorb(SubScan::Mempool, mempool, &mut failures).unwrap_or_default();
        let liquidation_opportunities =
            absorb(SubScan::Liquidations, liquidations, &mut failures).unwrap_or_default();
        let arbitrage_opportunities =
            absorb(SubScan::Arbitrage, arbitrage, &mut failures).unwrap_or_default();
        let gas_tiers = absorb(SubScan::Gas, gas, &mut failures);

        CycleReport {
            snapshot: ScanSnapshot {
                timestamp: Utc::now(),
                mempool_transactions,
                liquidation_opportunities,
                arbitrage_opportunities,
                gas_tiers,
            },
            failures,
        }
    }

    /// One full cycle: collect and emit.
    ///
    /// A panicking sub-scan only empties its own field. Any other panic in the
    /// cycle, such as one raised by the sink, becomes [`CycleError::Panicked`].
    pub async fn run_cycle<K: SnapshotSink>(&self, sink: &K) -> Result<CycleReport, CycleError> {
        let cycle = async {
            let report = self.collect().await;
            sink.emit(&report.snapshot).await?;
            Ok::<_, CycleError>(report)
        };

        AssertUnwindSafe(cycle)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(CycleError::Panicked(panic_message(payload))))
    }

    /// Delay before the next cycle given how the last one ended.
    pub fn next_delay(&self, outcome: &Result<CycleReport, CycleError>) -> Duration {
        match outcome {
            Ok(_) => self.settings.poll_interval,
            Err(_) => self.settings.error_backoff,
        }
    }

    /// Scan until `shutdown` turns true or its sender is dropped.
    pub async fn run<K: SnapshotSink>(&self, sink: &K, mut shutdown: watch::Receiver<bool>) {
        info!(
            "🔍 Scanner started ({}s interval, {}s backoff)",
            self.settings.poll_interval.as_secs(),
            self.settings.error_backoff.as_secs()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.state.send_replace(ScannerState::Scanning);
            debug!("Starting blockchain scan cycle...");

            let outcome = match self.settings.stop_mode {
                StopMode::Graceful => self.run_cycle(sink).await,
                StopMode::Immediate => {
                    tokio::select! {
                        outcome = self.run_cycle(sink) => outcome,
                        _ = stop_requested(&mut shutdown) => {
                            warn!("🛑 Stop requested, discarding in-flight scan cycle");
                            self.state.send_replace(ScannerState::Idle);
                            break;
                        }
                    }
                }
            };

            self.state.send_replace(ScannerState::Idle);

            match &outcome {
                Ok(report) => {
                    let snap = &report.snapshot;
                    info!(
                        "✅ Cycle done: {} txs, {} liquidations, {} arbs, gas {}",
                        snap.mempool_transactions.len(),
                        snap.liquidation_opportunities.len(),
                        snap.arbitrage_opportunities.len(),
                        if snap.gas_tiers.is_some() { "ok" } else { "n/a" }
                    );
                    for (scan, e) in &report.failures {
                        warn!("⚠️ {} scan contributed nothing: {}", scan, e);
                    }
                }
                Err(e) => error!("❌ Error in scan cycle: {}", e),
            }

            let delay = self.next_delay(&outcome);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = stop_requested(&mut shutdown) => break,
            }
        }

        info!("🛑 Scanner stopped");
    }
}

/// Resolves once the channel holds `true` or its sender is gone. Other writes are ignored.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Turn a panic in a sub-scan into an ordinary fetch failure.
async fn isolated<T, F>(scan: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    AssertUnwindSafe(scan)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(FetchError::Panicked(panic_message(payload))))
}

fn absorb<T>(
    scan: SubScan,
    result: Result<T, FetchError>,
    failures: &mut Vec<(SubScan, FetchError)>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            failures.push((scan, e));
            None
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
