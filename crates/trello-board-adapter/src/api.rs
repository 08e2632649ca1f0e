/*
[INPUT]:  Remote operations needed by consumers (reads, batch, writes)
[OUTPUT]: `TrelloApi` trait implemented by the HTTP client
[POS]:    Seam between the HTTP layer and consumers that want to swap the transport
[UPDATE]: When a consumer needs a new remote operation
*/

use async_trait::async_trait;

use crate::http::{Result, TrelloClient};
use crate::types::{
    BatchRequest, BatchResponse, BoardFilter, ListFilter, Member, RemoteBoard, RemoteCard,
    RemoteList,
};

/// Remote Trello operations, object-safe so callers can hold `Arc<dyn TrelloApi>`
#[async_trait]
pub trait TrelloApi: Send + Sync {
    async fn get_board(&self, board_id: &str) -> Result<RemoteBoard>;

    async fn list_lists(&self, board_id: &str, filter: ListFilter) -> Result<Vec<RemoteList>>;

    async fn list_cards(&self, list_id: &str) -> Result<Vec<RemoteCard>>;

    async fn get_card(&self, card_id: &str) -> Result<RemoteCard>;

    async fn get_list(&self, list_id: &str) -> Result<RemoteList>;

    async fn change_list(&self, card_id: &str, target_list_id: &str) -> Result<RemoteCard>;

    async fn add_card(&self, list_id: &str, name: &str, desc: &str) -> Result<RemoteCard>;

    async fn fetch_batch(&self, requests: &[BatchRequest]) -> Result<Vec<BatchResponse>>;

    async fn get_member(&self, member_id: &str) -> Result<Member>;

    async fn list_boards(&self, filter: BoardFilter) -> Result<Vec<RemoteBoard>>;
}

#[async_trait]
impl TrelloApi for TrelloClient {
    async fn get_board(&self, board_id: &str) -> Result<RemoteBoard> {
        TrelloClient::get_board(self, board_id).await
    }

    async fn list_lists(&self, board_id: &str, filter: ListFilter) -> Result<Vec<RemoteList>> {
        TrelloClient::list_lists(self, board_id, filter).await
    }

    async fn list_cards(&self, list_id: &str) -> Result<Vec<RemoteCard>> {
        TrelloClient::list_cards(self, list_id).await
    }

    async fn get_card(&self, card_id: &str) -> Result<RemoteCard> {
        TrelloClient::get_card(self, card_id).await
    }

    async fn get_list(&self, list_id: &str) -> Result<RemoteList> {
        TrelloClient::get_list(self, list_id).await
    }

    async fn change_list(&self, card_id: &str, target_list_id: &str) -> Result<RemoteCard> {
        TrelloClient::change_list(self, card_id, target_list_id).await
    }

    async fn add_card(&self, list_id: &str, name: &str, desc: &str) -> Result<RemoteCard> {
        TrelloClient::add_card(self, list_id, name, desc).await
    }

    async fn fetch_batch(&self, requests: &[BatchRequest]) -> Result<Vec<BatchResponse>> {
        TrelloClient::fetch_batch(self, requests).await
    }

    async fn get_member(&self, member_id: &str) -> Result<Member> {
        TrelloClient::get_member(self, member_id).await
    }

    async fn list_boards(&self, filter: BoardFilter) -> Result<Vec<RemoteBoard>> {
        TrelloClient::list_boards(self, filter).await
    }
}
