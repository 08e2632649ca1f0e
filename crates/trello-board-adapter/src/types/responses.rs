/*
[INPUT]:  Raw `/1/batch` response elements paired with their requests
[OUTPUT]: Typed batch responses carrying a status and a decoded payload
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new batchable resources are added
*/

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{RemoteBoard, RemoteCard, RemoteList};
use super::requests::BatchRequest;

/// Decoded payload of one batch element
#[derive(Debug, Clone, PartialEq)]
pub enum BatchBody {
    Board(RemoteBoard),
    Lists(Vec<RemoteList>),
    Cards(Vec<RemoteCard>),
    Error { message: String },
}

/// One element of a batch reply, in the same position as its request
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponse {
    /// HTTP status Trello reported for the sub-request (0 when unknown)
    pub status: u16,
    pub body: BatchBody,
}

impl BatchResponse {
    pub fn failed(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: BatchBody::Error {
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && !matches!(self.body, BatchBody::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.body {
            BatchBody::Error { message } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn into_board(self) -> Option<RemoteBoard> {
        match self.body {
            BatchBody::Board(board) => Some(board),
            _ => None,
        }
    }

    pub fn into_lists(self) -> Option<Vec<RemoteList>> {
        match self.body {
            BatchBody::Lists(lists) => Some(lists),
            _ => None,
        }
    }

    pub fn into_cards(self) -> Option<Vec<RemoteCard>> {
        match self.body {
            BatchBody::Cards(cards) => Some(cards),
            _ => None,
        }
    }

    /// Decode a raw batch element for the request at the same position.
    ///
    /// Successful elements look like `{"200": payload}`. Failures come back
    /// either keyed by another status code or as `{"statusCode": .., "message": ..}`.
    /// Anything undecodable becomes a failed response rather than an error so a
    /// single bad element never sinks the rest of the batch.
    pub fn decode(request: &BatchRequest, element: Value) -> Self {
        let Value::Object(mut map) = element else {
            return Self::failed(0, "batch element is not an object");
        };

        if let Some(status) = map.get("statusCode").and_then(Value::as_u64) {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Self::failed(status_code(status), message);
        }

        let status_key = map
            .keys()
            .find(|key| key.parse::<u16>().is_ok())
            .cloned();
        let Some(status_key) = status_key else {
            return Self::failed(0, "batch element has no status");
        };
        let status = status_key.parse::<u16>().unwrap_or_default();
        let payload = map.remove(&status_key).unwrap_or(Value::Null);

        if !(200..300).contains(&status) {
            return Self::failed(status, error_text(&payload));
        }

        let body = match request {
            BatchRequest::GetBoard { .. } => decode_payload(payload).map(BatchBody::Board),
            BatchRequest::GetLists { .. } => decode_payload(payload).map(BatchBody::Lists),
            BatchRequest::GetCards { .. } => decode_payload(payload).map(BatchBody::Cards),
        };

        match body {
            Ok(body) => Self { status, body },
            Err(err) => Self::failed(status, format!("undecodable payload: {err}")),
        }
    }
}

fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(payload)
}

fn status_code(raw: u64) -> u16 {
    u16::try_from(raw).unwrap_or_default()
}

fn error_text(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| payload.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BOARD_FIELDS, CARD_FIELDS, LIST_FIELDS, ListFilter};
    use serde_json::json;

    #[test]
    fn test_decode_board_success() {
        let request = BatchRequest::get_board("b1", BOARD_FIELDS);
        let response =
            BatchResponse::decode(&request, json!({"200": {"id": "b1", "name": "Home"}}));
        assert!(response.is_success());
        assert_eq!(response.status, 200);
        let board = response.into_board().expect("board payload");
        assert_eq!(board.name, "Home");
    }

    #[test]
    fn test_decode_lists_and_cards() {
        let lists = BatchResponse::decode(
            &BatchRequest::get_lists("b1", LIST_FIELDS, ListFilter::Open),
            json!({"200": [{"id": "l1", "name": "To Do", "cards": [{"id": "c1"}]}]}),
        );
        assert_eq!(lists.into_lists().map(|lists| lists.len()), Some(1));

        let cards = BatchResponse::decode(
            &BatchRequest::get_cards("b1", CARD_FIELDS),
            json!({"200": [{"id": "c1", "name": "Milk", "desc": "", "due": null, "idList": "l1"}]}),
        );
        let cards = cards.into_cards().expect("cards payload");
        assert_eq!(cards[0].id_list, "l1");
    }

    #[test]
    fn test_decode_status_keyed_failure() {
        let request = BatchRequest::get_board("missing", BOARD_FIELDS);
        let response = BatchResponse::decode(&request, json!({"404": "The requested resource was not found."}));
        assert!(!response.is_success());
        assert_eq!(response.status, 404);
        assert_eq!(
            response.error_message(),
            Some("The requested resource was not found.")
        );
    }

    #[test]
    fn test_decode_status_code_failure() {
        let request = BatchRequest::get_cards("b1", CARD_FIELDS);
        let response = BatchResponse::decode(
            &request,
            json!({"name": "InvalidId", "message": "invalid id", "statusCode": 400}),
        );
        assert_eq!(response.status, 400);
        assert_eq!(response.error_message(), Some("invalid id"));
    }

    #[test]
    fn test_decode_mismatched_payload_is_failure() {
        let request = BatchRequest::get_cards("b1", CARD_FIELDS);
        let response = BatchResponse::decode(&request, json!({"200": {"id": "b1"}}));
        assert!(!response.is_success());
        assert_eq!(response.status, 200);
        assert!(response.error_message().unwrap().starts_with("undecodable payload"));
    }

    #[test]
    fn test_decode_garbage_element() {
        let request = BatchRequest::get_board("b1", BOARD_FIELDS);
        assert!(!BatchResponse::decode(&request, json!("oops")).is_success());
        assert!(!BatchResponse::decode(&request, json!({"hello": 1})).is_success());
    }
}
