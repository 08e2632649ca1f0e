/*
[INPUT]:  Card and list identifiers, new card name/description
[OUTPUT]: Resolved cards/lists and the results of move/create writes
[POS]:    HTTP layer - lookup and mutation endpoints used by card actions
[UPDATE]: When adding card writes or changing how cards are addressed
*/

use reqwest::Method;

use crate::http::{Result, TrelloClient};
use crate::types::{CARD_FIELDS, RemoteCard, RemoteList};

impl TrelloClient {
    /// Fetch one card
    ///
    /// GET /1/cards/{card_id}
    pub async fn get_card(&self, card_id: &str) -> Result<RemoteCard> {
        let endpoint = format!("/1/cards/{}", card_id);
        let builder = self
            .request(Method::GET, &endpoint)?
            .query(&[("fields", CARD_FIELDS.join(","))]);
        self.send_json(builder).await
    }

    /// Fetch one list
    ///
    /// GET /1/lists/{list_id}
    pub async fn get_list(&self, list_id: &str) -> Result<RemoteList> {
        let endpoint = format!("/1/lists/{}", list_id);
        let builder = self
            .request(Method::GET, &endpoint)?
            .query(&[("fields", "name,closed,idBoard")]);
        self.send_json(builder).await
    }

    /// Reassign a card to another list
    ///
    /// PUT /1/cards/{card_id}?idList={target_list_id}
    pub async fn change_list(&self, card_id: &str, target_list_id: &str) -> Result<RemoteCard> {
        let endpoint = format!("/1/cards/{}", card_id);
        let builder = self
            .request(Method::PUT, &endpoint)?
            .query(&[("idList", target_list_id)]);
        self.send_json(builder).await
    }

    /// Append a new card to the bottom of a list
    ///
    /// POST /1/cards?idList={list_id}&name={name}&desc={desc}
    pub async fn add_card(&self, list_id: &str, name: &str, desc: &str) -> Result<RemoteCard> {
        let builder = self.request(Method::POST, "/1/cards")?.query(&[
            ("idList", list_id),
            ("name", name),
            ("desc", desc),
            ("pos", "bottom"),
        ]);
        self.send_json(builder).await
    }
}
