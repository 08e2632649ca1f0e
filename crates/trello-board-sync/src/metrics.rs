/*
[INPUT]:  Refresh cycle outcomes reported by the coordinator worker
[OUTPUT]: Snapshot-friendly refresh metrics for handles and the runner
[POS]:    Shared runtime metrics between the refresh worker and its readers
[UPDATE]: When adding/removing refresh-level runtime signals
*/

use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshMetricsSnapshot {
    /// Cycles finished, successful or not (the startup fetch included)
    pub completed_cycles: u64,
    pub in_flight: bool,
    pub successful_refreshes: u64,
    pub failed_refreshes: u64,
    /// Boards marked failed in the last published snapshot
    pub failed_boards: usize,
    pub last_success: Option<Instant>,
    pub last_update: Option<Instant>,
    pub last_error: Option<String>,
}

impl RefreshMetricsSnapshot {
    /// Whether the most recent finished cycle failed
    pub fn last_cycle_failed(&self) -> bool {
        self.last_error.is_some()
    }
}

#[derive(Debug, Default)]
pub struct RefreshMetrics {
    completed_cycles: u64,
    in_flight: bool,
    successful_refreshes: u64,
    failed_refreshes: u64,
    failed_boards: usize,
    last_success: Option<Instant>,
    last_update: Option<Instant>,
    last_error: Option<String>,
}

impl RefreshMetrics {
    pub fn snapshot(&self) -> RefreshMetricsSnapshot {
        RefreshMetricsSnapshot {
            completed_cycles: self.completed_cycles,
            in_flight: self.in_flight,
            successful_refreshes: self.successful_refreshes,
            failed_refreshes: self.failed_refreshes,
            failed_boards: self.failed_boards,
            last_success: self.last_success,
            last_update: self.last_update,
            last_error: self.last_error.clone(),
        }
    }

    pub fn record_started(&mut self) {
        self.in_flight = true;
        self.last_update = Some(Instant::now());
    }

    pub fn record_published(&mut self, failed_boards: usize) {
        let now = Instant::now();
        self.in_flight = false;
        self.completed_cycles += 1;
        self.successful_refreshes += 1;
        self.failed_boards = failed_boards;
        self.last_success = Some(now);
        self.last_update = Some(now);
        self.last_error = None;
    }

    pub fn record_failed(&mut self, error: impl ToString) {
        self.in_flight = false;
        self.completed_cycles += 1;
        self.failed_refreshes += 1;
        self.last_update = Some(Instant::now());
        self.last_error = Some(error.to_string());
    }
}
