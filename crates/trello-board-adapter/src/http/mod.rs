/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod batch;
pub mod board;
pub mod card;
pub mod client;
pub mod error;
pub mod member;

pub use error::{Result, TrelloError};

pub use batch::BATCH_CHUNK_SIZE;
pub use client::{ClientConfig, Credentials, TrelloClient};
