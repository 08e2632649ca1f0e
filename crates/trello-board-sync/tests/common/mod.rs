/*
[INPUT]:  Mock Trello server requirements
[OUTPUT]: Shared fixtures: configs pointed at wiremock, batch payloads, temp config files
[POS]:    Test infrastructure - shared across sync integration tests
[UPDATE]: When adding new test patterns or fixtures
*/

#![allow(dead_code)]

use std::io::Write;

use serde_json::{Value, json};
use tempfile::NamedTempFile;
use trello_board_sync::config::{CredentialsConfig, FetchStrategyKind, HttpConfig, SyncConfig};
use wiremock::MockServer;

pub const NOT_FOUND: &str = "The requested resource was not found.";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Config against `server` with test credentials
pub fn config_for(server: &MockServer, board_ids: &[&str], fetch_strategy: FetchStrategyKind) -> SyncConfig {
    SyncConfig {
        credentials: CredentialsConfig {
            api_key: "test-key".to_string(),
            api_token: "test-token".to_string(),
        },
        board_ids: board_ids.iter().map(|id| id.to_string()).collect(),
        update_interval_secs: 3600,
        fetch_strategy,
        http: HttpConfig {
            base_url: Some(server.uri()),
            ..HttpConfig::default()
        },
    }
}

/// Batch elements for a loaded board: board, lists, cards
pub fn loaded_board(id: &str, name: &str, lists: &[(&str, &str)], cards: &[(&str, &str, &str)]) -> Vec<Value> {
    let lists: Vec<Value> = lists
        .iter()
        .map(|(list_id, list_name)| json!({"id": list_id, "name": list_name}))
        .collect();
    let cards: Vec<Value> = cards
        .iter()
        .map(|(card_id, list_id, card_name)| {
            json!({"id": card_id, "name": card_name, "desc": "", "due": null, "idList": list_id})
        })
        .collect();

    vec![
        json!({"200": {"id": id, "name": name}}),
        json!({"200": lists}),
        json!({"200": cards}),
    ]
}

/// Batch elements for a board Trello does not know
pub fn missing_board() -> Vec<Value> {
    vec![json!({"404": NOT_FOUND}); 3]
}

/// Write `contents` to a temporary `.yaml` file
pub fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}
