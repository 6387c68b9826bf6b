//! Continuous monitor: batch-scans derivation nodes as producers emit them.
//!
//! Nodes arrive over an mpsc channel, are grouped into batches of up to
//! `batch_size` (or whatever is pending when the flush interval fires), scanned
//! with [`ContaminationDetector::analyze_batch`], and the evidence is ingested
//! by the firewall. Stopping drains the queue before the task exits.

use std::sync::Arc;
use std::time::Duration;

use sealgate_core::DerivationNode;
use sealgate_core::config::MonitorConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::detector::ContaminationDetector;
use crate::firewall::ExperimentalFirewall;

/// Totals accumulated by a monitor over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStats {
    pub nodes_scanned: usize,
    pub evidence_found: usize,
    pub alerts_raised: usize,
    pub batches: usize,
    pub failed_scans: usize,
}

/// Handle to a running monitor task.
pub struct MonitorHandle {
    sender: mpsc::Sender<DerivationNode>,
    cancel: CancellationToken,
    join: JoinHandle<MonitorStats>,
}

impl MonitorHandle {
    /// Queue a node for scanning. Returns `false` once the monitor has stopped.
    pub async fn submit(&self, node: DerivationNode) -> bool {
        self.sender.send(node).await.is_ok()
    }

    /// A sender for producers that outlive this handle's borrow.
    pub fn sender(&self) -> mpsc::Sender<DerivationNode> {
        self.sender.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.join.is_finished()
    }

    /// Signal the monitor to stop and wait for its final stats.
    pub async fn stop(self) -> MonitorStats {
        self.cancel.cancel();
        match self.join.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Monitor task failed: {}", e);
                MonitorStats::default()
            }
        }
    }
}

pub struct ContinuousMonitor {
    detector: Arc<ContaminationDetector>,
    firewall: Arc<ExperimentalFirewall>,
    batch_size: usize,
    stats: MonitorStats,
}

impl ContinuousMonitor {
    /// Spawn the monitor on the current tokio runtime.
    pub fn spawn(
        detector: Arc<ContaminationDetector>,
        firewall: Arc<ExperimentalFirewall>,
        config: MonitorConfig,
    ) -> MonitorHandle {
        let batch_size = config.batch_size.max(1);
        let (sender, receiver) = mpsc::channel(batch_size * 4);
        let cancel = CancellationToken::new();
        let flush_interval = Duration::from_millis(config.flush_interval_ms.max(1));

        let monitor = Self {
            detector,
            firewall,
            batch_size,
            stats: MonitorStats::default(),
        };
        let join = tokio::spawn(monitor.run(receiver, cancel.clone(), flush_interval));
        tracing::info!(batch_size, "Continuous monitor started");

        MonitorHandle {
            sender,
            cancel,
            join,
        }
    }

    async fn run(
        mut self,
        mut receiver: mpsc::Receiver<DerivationNode>,
        cancel: CancellationToken,
        flush_interval: Duration,
    ) -> MonitorStats {
        let mut pending: Vec<DerivationNode> = Vec::with_capacity(self.batch_size);
        let mut ticker = tokio::time::interval(flush_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = receiver.recv() => match received {
                    Some(node) => {
                        pending.push(node);
                        if pending.len() >= self.batch_size {
                            self.flush(&mut pending).await;
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    if !pending.is_empty() {
                        self.flush(&mut pending).await;
                    }
                }
            }
        }

        receiver.close();
        while let Ok(node) = receiver.try_recv() {
            pending.push(node);
            if pending.len() >= self.batch_size {
                self.flush(&mut pending).await;
            }
        }
        if !pending.is_empty() {
            self.flush(&mut pending).await;
        }

        tracing::info!(
            nodes = self.stats.nodes_scanned,
            evidence = self.stats.evidence_found,
            batches = self.stats.batches,
            "Continuous monitor stopped"
        );
        self.stats
    }

    async fn flush(&mut self, pending: &mut Vec<DerivationNode>) {
        let batch = std::mem::take(pending);
        let result = self.detector.analyze_batch(batch).await;
        let alerts = self.firewall.ingest_evidence(&result.evidence);

        self.stats.batches += 1;
        self.stats.nodes_scanned += result.nodes_scanned;
        self.stats.evidence_found += result.evidence.len();
        self.stats.alerts_raised += alerts;
        self.stats.failed_scans += result.failed;

        tracing::debug!(
            nodes = result.nodes_scanned,
            evidence = result.evidence.len(),
            alerts,
            duration_ms = result.duration_ms,
            "Monitor batch scanned"
        );
    }
}
