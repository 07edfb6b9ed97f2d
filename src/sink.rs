// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot consumers.

use std::future::Future;
use std::io::Write;
use tokio::sync::mpsc;

use crate::error::SinkError;
use crate::types::ScanSnapshot;

/// Receives one snapshot per completed scan cycle.
pub trait SnapshotSink: Send + Sync {
    fn emit(&self, snapshot: &ScanSnapshot) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Prints each snapshot as pretty JSON on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStdoutSink;

impl SnapshotSink for JsonStdoutSink {
    async fn emit(&self, snapshot: &ScanSnapshot) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| SinkError::Serialize(e.to_string()))?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", json).map_err(|e| SinkError::Delivery(e.to_string()))
    }
}

/// Forwards snapshots to an in-process consumer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<ScanSnapshot>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<ScanSnapshot>) -> Self {
        Self { tx }
    }
}

impl SnapshotSink for ChannelSink {
    async fn emit(&self, snapshot: &ScanSnapshot) -> Result<(), SinkError> {
        self.tx
            .send(snapshot.clone())
            .await
            .map_err(|e| SinkError::Delivery(format!("receiver dropped: {}", e)))
    }
}

/// Emit to both sinks; the first failure wins.
impl<A: SnapshotSink, B: SnapshotSink> SnapshotSink for (A, B) {
    async fn emit(&self, snapshot: &ScanSnapshot) -> Result<(), SinkError> {
        self.0.emit(snapshot).await?;
        self.1.emit(snapshot).await
    }
}

/// Optional sink, a no-op when absent.
impl<T: SnapshotSink> SnapshotSink for Option<T> {
    async fn emit(&self, snapshot: &ScanSnapshot) -> Result<(), SinkError> {
        match self {
            Some(sink) => sink.emit(snapshot).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot() -> ScanSnapshot {
        ScanSnapshot {
            timestamp: Utc::now(),
            mempool_transactions: vec![],
            liquidation_opportunities: vec![],
            arbitrage_opportunities: vec![],
            gas_tiers: None,
        }
    }

    #[tokio::test]
    async fn channel_sink_forwards() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink = ChannelSink::new(tx);
        let snap = snapshot();
        sink.emit(&snap).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), snap);
    }

    #[tokio::test]
    async fn channel_sink_fails_without_receiver() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let err = ChannelSink::new(tx).emit(&snapshot()).await.unwrap_err();
        assert!(matches!(err, SinkError::Delivery(_)));
    }

    #[tokio::test]
    async fn pair_and_option_sinks() {
        let (tx_a, mut rx_a) = mpsc::channel(1);
        let (tx_b, mut rx_b) = mpsc::channel(1);
        let sink = (ChannelSink::new(tx_a), Some(ChannelSink::new(tx_b)));
        sink.emit(&snapshot()).await.unwrap();
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());

        let none: Option<ChannelSink> = None;
        none.emit(&snapshot()).await.unwrap();
    }

    #[test]
    fn snapshot_serializes_with_expected_fields() {
        let value = serde_json::to_value(snapshot()).unwrap();
        for field in [
            "timestamp",
            "mempool_transactions",
            "liquidation_opportunities",
            "arbitrage_opportunities",
            "gas_tiers",
        ] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
    }
}
