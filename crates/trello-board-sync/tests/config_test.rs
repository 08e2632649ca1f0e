/*
[INPUT]:  YAML config files on disk + injected environment variables
[OUTPUT]: Test results for config loading, layering and validation
[POS]:    Integration tests - configuration layer
[UPDATE]: When config fields or environment layering change
*/

mod common;

use std::collections::HashMap;
use std::time::Duration;

use common::write_config;
use tokio_test::assert_ok;
use trello_board_sync::{FetchStrategyKind, SyncConfig};

const MINIMAL: &str = r#"
credentials:
  api_key: file-key
  api_token: file-token
board_ids:
  - b1
  - b2
"#;

fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    )
}

#[test]
fn test_load_minimal_file_applies_defaults() {
    let file = write_config(MINIMAL);
    let config = assert_ok!(SyncConfig::load_with_env(file.path(), env(&[])));

    assert_eq!(config.board_ids, vec!["b1", "b2"]);
    assert_eq!(config.interval(), Duration::from_secs(60));
    assert_eq!(config.fetch_strategy, FetchStrategyKind::Batched);
    assert_eq!(config.http.timeout_secs, 30);
}

#[test]
fn test_environment_overrides_file() {
    let file = write_config(MINIMAL);
    let config = assert_ok!(SyncConfig::load_with_env(
        file.path(),
        env(&[
            ("TRELLO_SYNC__CREDENTIALS__API_TOKEN", "env-token"),
            ("TRELLO_SYNC__UPDATE_INTERVAL_SECS", "15"),
            ("TRELLO_SYNC__FETCH_STRATEGY", "sequential"),
            ("TRELLO_SYNC__BOARD_IDS", "b3,b4,b5"),
        ])
    ));

    assert_eq!(config.credentials.api_key, "file-key");
    assert_eq!(config.credentials.api_token, "env-token");
    assert_eq!(config.update_interval_secs, 15);
    assert_eq!(config.fetch_strategy, FetchStrategyKind::Sequential);
    assert_eq!(config.board_ids, vec!["b3", "b4", "b5"]);
}

#[test]
fn test_environment_keeps_numeric_looking_strings() {
    let file = write_config(MINIMAL);
    let config = assert_ok!(SyncConfig::load_with_env(
        file.path(),
        env(&[
            ("TRELLO_SYNC__CREDENTIALS__API_TOKEN", "00012345"),
            ("TRELLO_SYNC__CREDENTIALS__API_KEY", "0042"),
            ("TRELLO_SYNC__BOARD_IDS", "007,b2"),
            ("TRELLO_SYNC__UPDATE_INTERVAL_SECS", "90"),
        ])
    ));

    assert_eq!(config.credentials.api_token, "00012345");
    assert_eq!(config.credentials.api_key, "0042");
    assert_eq!(config.board_ids, vec!["007", "b2"]);
    assert_eq!(config.update_interval_secs, 90);
}

#[test]
fn test_load_rejects_duplicate_boards() {
    let file = write_config(
        r#"
credentials:
  api_key: k
  api_token: t
board_ids: [b1, b1]
"#,
    );
    let err = SyncConfig::load_with_env(file.path(), env(&[])).expect_err("duplicates");
    assert!(format!("{err:#}").contains("more than once"));
}

#[test]
fn test_load_rejects_zero_interval_and_unknown_strategy() {
    let file = write_config(&format!("{MINIMAL}update_interval_secs: 0\n"));
    assert!(SyncConfig::load_with_env(file.path(), env(&[])).is_err());

    let file = write_config(&format!("{MINIMAL}fetch_strategy: parallel\n"));
    assert!(SyncConfig::load_with_env(file.path(), env(&[])).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let err = SyncConfig::load_with_env("/nonexistent/trello-sync.yaml", env(&[])).expect_err("missing");
    assert!(format!("{err:#}").contains("read config"));
}

#[test]
fn test_written_yaml_loads_back() {
    let file = write_config(MINIMAL);
    let config = assert_ok!(SyncConfig::load_with_env(file.path(), env(&[])));

    let copy = write_config(&assert_ok!(config.to_yaml()));
    let reloaded = assert_ok!(SyncConfig::load_with_env(copy.path(), env(&[])));
    assert_eq!(reloaded.board_ids, config.board_ids);
    assert_eq!(reloaded.credentials.api_token, "file-token");
}
