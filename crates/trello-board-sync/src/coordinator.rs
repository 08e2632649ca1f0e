/*
[INPUT]:  A fetch strategy, configured board ids, a polling interval and on-demand refresh requests
[OUTPUT]: Latest board snapshot via `watch` + refresh metrics
[POS]:    Coordination layer - owns polling cadence and the single writer of the snapshot
[UPDATE]: When changing refresh triggers, coalescing, or snapshot publication semantics
*/

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::fetch::FetchStrategy;
use crate::metrics::{RefreshMetrics, RefreshMetricsSnapshot};
use crate::model::{BoardMap, Snapshot, unique_board_ids};

#[derive(Debug)]
enum RefreshCommand {
    Refresh,
}

#[derive(Debug, Clone, Copy)]
enum RefreshTrigger {
    Scheduled,
    Requested,
}

/// Cheap, cloneable access to the coordinator: read the snapshot, ask for a refresh.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    snapshot_rx: watch::Receiver<Arc<Snapshot>>,
    metrics_rx: watch::Receiver<RefreshMetricsSnapshot>,
    cmd_tx: mpsc::Sender<RefreshCommand>,
}

impl RefreshHandle {
    /// The last published snapshot. Never waits on a fetch.
    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to snapshot replacements published after this call
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        let mut snapshot_rx = self.snapshot_rx.clone();
        snapshot_rx.mark_unchanged();
        snapshot_rx
    }

    pub fn subscribe_metrics(&self) -> watch::Receiver<RefreshMetricsSnapshot> {
        self.metrics_rx.clone()
    }

    pub fn metrics(&self) -> RefreshMetricsSnapshot {
        self.metrics_rx.borrow().clone()
    }

    /// Queue a refresh without waiting for it.
    ///
    /// Returns `false` when a refresh is already queued (the request is folded
    /// into it) or the worker has stopped.
    pub fn request_refresh(&self) -> bool {
        match self.cmd_tx.try_send(RefreshCommand::Refresh) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Refresh already queued");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Request a refresh and wait for a cycle that started after this call.
    ///
    /// Returns the snapshot published by that cycle, or its error when the
    /// fetch failed (the previous snapshot then stays current).
    pub async fn refresh_and_wait(&self) -> Result<Arc<Snapshot>> {
        let mut metrics_rx = self.metrics_rx.clone();
        let target = {
            let status = metrics_rx.borrow_and_update();
            // A cycle already running started before us; wait for the one after it
            status.completed_cycles + 1 + u64::from(status.in_flight)
        };

        if let Err(TrySendError::Closed(_)) = self.cmd_tx.try_send(RefreshCommand::Refresh) {
            bail!("refresh worker has stopped");
        }

        let last_error = metrics_rx
            .wait_for(|status| status.completed_cycles >= target)
            .await
            .map_err(|_| anyhow!("refresh worker has stopped"))?
            .last_error
            .clone();

        if let Some(error) = last_error {
            bail!("refresh failed: {error}");
        }
        Ok(self.current_snapshot())
    }
}

/// Periodic fetch-and-publish loop over a set of boards.
///
/// `start` performs the first fetch inline; only a successful first fetch
/// spawns the worker. Dropping the coordinator stops the worker.
#[derive(Debug)]
pub struct RefreshCoordinator {
    handle: RefreshHandle,
    shutdown: CancellationToken,
    worker_handle: Option<JoinHandle<()>>,
}

impl RefreshCoordinator {
    pub async fn start(
        strategy: Arc<dyn FetchStrategy>,
        board_ids: Vec<String>,
        interval: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            bail!("refresh interval must be greater than zero");
        }
        let board_ids = unique_board_ids(&board_ids);

        let mut metrics = RefreshMetrics::default();
        metrics.record_started();
        let boards = strategy
            .fetch(&board_ids)
            .await
            .context("initial board refresh failed")?;

        let snapshot = Snapshot::new(1, &board_ids, boards);
        let failed_boards = snapshot.failed_board_ids().len();
        metrics.record_published(failed_boards);
        info!(
            strategy = strategy.name(),
            boards = snapshot.len(),
            failed_boards,
            interval_secs = interval.as_secs(),
            "Initial board snapshot published"
        );

        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(snapshot));
        let (metrics_tx, metrics_rx) = watch::channel(metrics.snapshot());
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        let shutdown = CancellationToken::new();

        let worker = RefreshWorker {
            strategy,
            board_ids,
            interval,
            cmd_rx,
            snapshot_tx,
            metrics_tx,
            metrics,
            shutdown: shutdown.clone(),
        };
        let worker_handle = tokio::spawn(worker.run());

        Ok(Self {
            handle: RefreshHandle {
                snapshot_rx,
                metrics_rx,
                cmd_tx,
            },
            shutdown,
            worker_handle: Some(worker_handle),
        })
    }

    pub fn handle(&self) -> RefreshHandle {
        self.handle.clone()
    }

    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.handle.current_snapshot()
    }

    /// Signal the worker to stop; an in-flight fetch is abandoned.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub async fn shutdown_and_wait(&mut self) -> Result<()> {
        self.shutdown();
        if let Some(worker_handle) = self.worker_handle.take() {
            worker_handle.await.context("refresh worker panicked")?;
        }
        Ok(())
    }
}

impl Drop for RefreshCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct RefreshWorker {
    strategy: Arc<dyn FetchStrategy>,
    board_ids: Vec<String>,
    interval: Duration,
    cmd_rx: mpsc::Receiver<RefreshCommand>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    metrics_tx: watch::Sender<RefreshMetricsSnapshot>,
    metrics: RefreshMetrics,
    shutdown: CancellationToken,
}

impl RefreshWorker {
    async fn run(mut self) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let trigger = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => RefreshTrigger::Scheduled,
                command = self.cmd_rx.recv() => match command {
                    Some(RefreshCommand::Refresh) => RefreshTrigger::Requested,
                    None => break,
                },
            };

            self.metrics.record_started();
            self.metrics_tx.send_replace(self.metrics.snapshot());

            let outcome = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                outcome = self.strategy.fetch(&self.board_ids) => outcome,
            };
            self.complete(trigger, outcome);

            // Any refresh pushes the next scheduled one a full interval away
            ticker.reset();
        }

        debug!("Refresh worker stopped");
    }

    fn complete(&mut self, trigger: RefreshTrigger, outcome: trello_board_adapter::Result<BoardMap>) {
        match outcome {
            Ok(boards) => {
                let generation = self.snapshot_tx.borrow().generation() + 1;
                let snapshot = Snapshot::new(generation, &self.board_ids, boards);
                let failed_boards = snapshot.failed_board_ids().len();

                self.snapshot_tx.send_replace(Arc::new(snapshot));
                self.metrics.record_published(failed_boards);
                debug!(generation, failed_boards, ?trigger, "Board snapshot published");
            }
            Err(err) => {
                error!(error = %err, ?trigger, "Board refresh failed; keeping previous snapshot");
                self.metrics.record_failed(&err);
            }
        }
        self.metrics_tx.send_replace(self.metrics.snapshot());
    }
}
