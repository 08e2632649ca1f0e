/*
[INPUT]:  Move/create card requests from the runner (or any host)
[OUTPUT]: Remote mutations followed by a snapshot refresh
[POS]:    Action layer - the only writes this crate issues against Trello
[UPDATE]: When adding card operations or changing post-mutation refresh behavior
*/

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use trello_board_adapter::{TrelloApi, TrelloError};

use crate::coordinator::RefreshHandle;

/// Card mutations that keep the published snapshot in step with Trello.
///
/// Each remote sequence runs on its own task, never on the refresh worker.
/// A successful mutation waits for a refresh so the snapshot shows it when
/// the call returns; a failed one only queues a refresh and returns the
/// adapter error (downcastable to `TrelloError`).
#[derive(Clone)]
pub struct CardActions {
    api: Arc<dyn TrelloApi>,
    refresh: RefreshHandle,
}

impl CardActions {
    pub fn new(api: Arc<dyn TrelloApi>, refresh: RefreshHandle) -> Self {
        Self { api, refresh }
    }

    /// Move a card to another list
    pub async fn move_card(&self, card_id: &str, target_list_id: &str) -> Result<()> {
        require("card_id", card_id)?;
        require("target_list_id", target_list_id)?;

        let api = self.api.clone();
        let (card_id, target_list_id) = (card_id.to_string(), target_list_id.to_string());
        let outcome = tokio::spawn(async move {
            let card = api.get_card(&card_id).await?;
            let target = api.get_list(&target_list_id).await?;
            let moved = api.change_list(&card.id, &target.id).await?;
            info!(card_id = %moved.id, from = %card.id_list, to = %target.id, "Card moved");
            Ok::<_, TrelloError>(())
        })
        .await
        .context("move_card task aborted")?;

        self.settle("move_card", outcome).await
    }

    /// Create a card at the bottom of a list, returning the new card id
    pub async fn create_card(&self, list_id: &str, name: &str, description: &str) -> Result<String> {
        require("list_id", list_id)?;
        require("name", name)?;

        let api = self.api.clone();
        let (list_id, name, description) = (list_id.to_string(), name.to_string(), description.to_string());
        let outcome = tokio::spawn(async move {
            let list = api.get_list(&list_id).await?;
            let card = api.add_card(&list.id, &name, &description).await?;
            info!(card_id = %card.id, list_id = %list.id, "Card created");
            Ok::<_, TrelloError>(card.id)
        })
        .await
        .context("create_card task aborted")?;

        self.settle("create_card", outcome).await
    }

    async fn settle<T>(&self, action: &'static str, outcome: trello_board_adapter::Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                if let Err(err) = self.refresh.refresh_and_wait().await {
                    warn!(action, error = %err, "Refresh after card update failed");
                }
                Ok(value)
            }
            Err(err) => {
                self.refresh.request_refresh();
                Err(anyhow::Error::new(err).context(format!("{action} failed")))
            }
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} must not be empty");
    }
    Ok(())
}
