/*
[INPUT]:  Trello query filter vocabulary
[OUTPUT]: Typed filter enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

/// Which lists of a board a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFilter {
    #[default]
    Open,
    Closed,
    All,
    None,
}

impl ListFilter {
    pub fn as_query(self) -> &'static str {
        match self {
            ListFilter::Open => "open",
            ListFilter::Closed => "closed",
            ListFilter::All => "all",
            ListFilter::None => "none",
        }
    }
}

/// Which boards of a member a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardFilter {
    #[default]
    Open,
    Closed,
    Starred,
    All,
}

impl BoardFilter {
    pub fn as_query(self) -> &'static str {
        match self {
            BoardFilter::Open => "open",
            BoardFilter::Closed => "closed",
            BoardFilter::Starred => "starred",
            BoardFilter::All => "all",
        }
    }
}
