/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for trello-board-adapter tests

use trello_board_adapter::{ClientConfig, Credentials, TrelloClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Fixed credentials used against mock servers
pub fn test_credentials() -> Credentials {
    Credentials::new("test-key", "test-token")
}

/// Client pointed at a mock server with test credentials
pub fn client_for(server: &MockServer) -> TrelloClient {
    TrelloClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init")
        .with_credentials(test_credentials())
}
