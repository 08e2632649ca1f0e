/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Trello adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod api;
pub mod http;
pub mod types;

pub use api::TrelloApi;

// Re-export commonly used types from http
pub use http::{
    BATCH_CHUNK_SIZE,
    ClientConfig,
    Credentials,
    Result,
    TrelloClient,
    TrelloError,
};

// Re-export all types
pub use types::*;
