/*
[INPUT]:  Public API exports for trello-board-sync crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod actions;
pub mod config;
pub mod coordinator;
pub mod fetch;
pub mod metrics;
pub mod model;
pub mod sensor;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use actions::CardActions;
pub use config::{FetchStrategyKind, SyncConfig};
pub use coordinator::{RefreshCoordinator, RefreshHandle};
pub use fetch::{BatchedFetch, FetchStrategy, SequentialFetch, strategy_for};
pub use metrics::RefreshMetricsSnapshot;
pub use model::{Board, BoardEntry, BoardMap, Card, List, Snapshot};
pub use sensor::{BoardSensor, ListSensor, Sensor, SensorState, discover_sensors};
