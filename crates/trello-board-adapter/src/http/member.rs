/*
[INPUT]:  Member identifier and board filter
[OUTPUT]: Member profile and the boards visible to the token
[POS]:    HTTP layer - account endpoints used by setup (board discovery)
[UPDATE]: When changing member fields or board discovery
*/

use reqwest::Method;

use crate::http::{Result, TrelloClient};
use crate::types::{BOARD_FIELDS, BoardFilter, Member, RemoteBoard};

impl TrelloClient {
    /// Fetch a member; `"me"` resolves to the token owner
    ///
    /// GET /1/members/{member_id}
    pub async fn get_member(&self, member_id: &str) -> Result<Member> {
        let endpoint = format!("/1/members/{}", member_id);
        let builder = self
            .request(Method::GET, &endpoint)?
            .query(&[("fields", "username,fullName,email")]);
        self.send_json(builder).await
    }

    /// List the token owner's boards
    ///
    /// GET /1/members/me/boards?filter={filter}&fields=name
    pub async fn list_boards(&self, filter: BoardFilter) -> Result<Vec<RemoteBoard>> {
        let builder = self.request(Method::GET, "/1/members/me/boards")?.query(&[
            ("filter", filter.as_query().to_string()),
            ("fields", BOARD_FIELDS.join(",")),
        ]);
        self.send_json(builder).await
    }
}
