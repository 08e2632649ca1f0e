/*
[INPUT]:  Board and list identifiers, list filters
[OUTPUT]: Board metadata, open lists and their cards
[POS]:    HTTP layer - read endpoints used by the refresh cycle
[UPDATE]: When changing requested fields or adding board-scoped reads
*/

use reqwest::Method;

use crate::http::{Result, TrelloClient};
use crate::types::{BOARD_FIELDS, CARD_FIELDS, LIST_FIELDS, ListFilter, RemoteBoard, RemoteCard, RemoteList};

impl TrelloClient {
    /// Fetch board metadata (name only)
    ///
    /// GET /1/boards/{board_id}?fields=name
    pub async fn get_board(&self, board_id: &str) -> Result<RemoteBoard> {
        let endpoint = format!("/1/boards/{}", board_id);
        let builder = self
            .request(Method::GET, &endpoint)?
            .query(&[("fields", BOARD_FIELDS.join(","))]);
        self.send_json(builder).await
    }

    /// Fetch the lists of a board
    ///
    /// GET /1/boards/{board_id}/lists?filter={filter}&fields=name
    pub async fn list_lists(&self, board_id: &str, filter: ListFilter) -> Result<Vec<RemoteList>> {
        let endpoint = format!("/1/boards/{}/lists", board_id);
        let builder = self.request(Method::GET, &endpoint)?.query(&[
            ("filter", filter.as_query().to_string()),
            ("fields", LIST_FIELDS.join(",")),
        ]);
        self.send_json(builder).await
    }

    /// Fetch the open cards of one list
    ///
    /// GET /1/lists/{list_id}/cards?fields=name,desc,due,idList
    pub async fn list_cards(&self, list_id: &str) -> Result<Vec<RemoteCard>> {
        let endpoint = format!("/1/lists/{}/cards", list_id);
        let builder = self
            .request(Method::GET, &endpoint)?
            .query(&[("fields", CARD_FIELDS.join(","))]);
        self.send_json(builder).await
    }
}
