/*
[INPUT]:  YAML configuration file layered with TRELLO_SYNC__* environment variables
[OUTPUT]: Validated sync configuration
[POS]:    Configuration layer - credentials, boards, cadence, transport
[UPDATE]: When adding new configuration options
*/

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use trello_board_adapter::{ClientConfig, Credentials, TrelloClient};

pub const ENV_PREFIX: &str = "TRELLO_SYNC";
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 60;

/// Top-level configuration for the board sync runner
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    pub credentials: CredentialsConfig,
    /// Boards to poll, in presentation order
    pub board_ids: Vec<String>,
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    #[serde(default)]
    pub fetch_strategy: FetchStrategyKind,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Trello API key + user token
#[derive(Clone, Deserialize, Serialize)]
pub struct CredentialsConfig {
    pub api_key: String,
    pub api_token: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// How a refresh cycle talks to Trello
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategyKind {
    /// One batch call for every board
    #[default]
    Batched,
    /// Board, lists, then cards per list, one board at a time
    Sequential,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Override of https://api.trello.com
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            base_url: None,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_update_interval_secs() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl SyncConfig {
    /// Load and validate configuration from a YAML file and the process environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`SyncConfig::load`], reading variables from `env` instead of the process when given
    pub fn load_with_env(path: impl AsRef<Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let path = path.as_ref();
        let vars: HashMap<String, String> = env.unwrap_or_else(|| std::env::vars().collect());
        let board_ids = vars.get(&format!("{ENV_PREFIX}__BOARD_IDS")).map(|raw| split_list(raw));

        // values stay strings; typed fields are converted on deserialize
        let environment = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(vars));

        let mut builder = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(environment);
        if let Some(board_ids) = board_ids {
            builder = builder
                .set_override("board_ids", board_ids)
                .context("apply board_ids from environment")?;
        }

        let config: Self = builder
            .build()
            .with_context(|| format!("read config from {}", path.display()))?
            .try_deserialize()
            .context("parse config")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.credentials.api_key.trim().is_empty() {
            bail!("credentials.api_key must not be empty");
        }
        if self.credentials.api_token.trim().is_empty() {
            bail!("credentials.api_token must not be empty");
        }
        if self.board_ids.is_empty() {
            bail!("board_ids must list at least one board");
        }

        let mut seen = HashSet::new();
        for board_id in &self.board_ids {
            if board_id.trim().is_empty() {
                bail!("board_ids must not contain empty ids");
            }
            if !seen.insert(board_id.as_str()) {
                bail!("board id {board_id} is listed more than once");
            }
        }

        if self.update_interval_secs == 0 {
            bail!("update_interval_secs must be greater than zero");
        }
        if self.http.timeout_secs == 0 || self.http.connect_timeout_secs == 0 {
            bail!("http timeouts must be greater than zero");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.http.timeout_secs),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
        }
    }

    /// Authenticated client for the configured host
    pub fn trello_client(&self) -> Result<TrelloClient> {
        let client = match &self.http.base_url {
            Some(base_url) => TrelloClient::with_config_and_base_url(self.client_config(), base_url),
            None => TrelloClient::with_config(self.client_config()),
        }
        .context("build Trello client")?;

        Ok(client.with_credentials(Credentials::new(
            self.credentials.api_key.as_str(),
            self.credentials.api_token.as_str(),
        )))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }
}
