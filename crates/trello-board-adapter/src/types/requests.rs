/*
[INPUT]:  Board ids, field selections and list filters
[OUTPUT]: Typed batch request descriptors rendered as Trello relative URLs
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When adding batchable resources or changing requested fields
*/

use serde::{Deserialize, Serialize};

use super::enums::ListFilter;

/// One sub-request of a `/1/batch` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchRequest {
    GetBoard {
        board_id: String,
        fields: Vec<String>,
    },
    GetLists {
        board_id: String,
        fields: Vec<String>,
        filter: ListFilter,
        /// Nest the ids of each list's open cards in the payload
        card_refs: bool,
    },
    GetCards {
        board_id: String,
        fields: Vec<String>,
    },
}

impl BatchRequest {
    pub fn get_board(board_id: impl Into<String>, fields: &[&str]) -> Self {
        BatchRequest::GetBoard {
            board_id: board_id.into(),
            fields: owned_fields(fields),
        }
    }

    pub fn get_lists(board_id: impl Into<String>, fields: &[&str], filter: ListFilter) -> Self {
        BatchRequest::GetLists {
            board_id: board_id.into(),
            fields: owned_fields(fields),
            filter,
            card_refs: true,
        }
    }

    pub fn get_cards(board_id: impl Into<String>, fields: &[&str]) -> Self {
        BatchRequest::GetCards {
            board_id: board_id.into(),
            fields: owned_fields(fields),
        }
    }

    pub fn board_id(&self) -> &str {
        match self {
            BatchRequest::GetBoard { board_id, .. }
            | BatchRequest::GetLists { board_id, .. }
            | BatchRequest::GetCards { board_id, .. } => board_id,
        }
    }

    /// Relative URL as Trello expects it inside the `urls` batch parameter
    /// (unencoded, without the `/1` version prefix).
    pub fn relative_url(&self) -> String {
        match self {
            BatchRequest::GetBoard { board_id, fields } => {
                format!("/boards/{}?fields={}", board_id, fields.join(","))
            }
            BatchRequest::GetLists {
                board_id,
                fields,
                filter,
                card_refs,
            } => {
                let mut url = format!(
                    "/boards/{}/lists?filter={}&fields={}",
                    board_id,
                    filter.as_query(),
                    fields.join(",")
                );
                if *card_refs {
                    url.push_str("&cards=open&card_fields=id");
                }
                url
            }
            BatchRequest::GetCards { board_id, fields } => {
                format!("/boards/{}/cards?fields={}", board_id, fields.join(","))
            }
        }
    }
}

fn owned_fields(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| field.to_string()).collect()
}
