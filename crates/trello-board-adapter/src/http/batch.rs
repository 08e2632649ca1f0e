/*
[INPUT]:  Ordered batch request descriptors
[OUTPUT]: Ordered typed batch responses (one per request)
[POS]:    HTTP layer - `/1/batch` multiplexing of GET requests
[UPDATE]: When changing chunking or batch element decoding
*/

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::http::{Result, TrelloClient, TrelloError};
use crate::types::{BatchRequest, BatchResponse};

/// Requests per HTTP call. Trello caps a batch at 10 URLs; a multiple of
/// three keeps each board's board/lists/cards triple inside one call.
pub const BATCH_CHUNK_SIZE: usize = 9;

impl TrelloClient {
    /// Run GET requests through the batch endpoint.
    ///
    /// GET /1/batch?urls={url},{url},...
    ///
    /// Responses come back in request order. A failed sub-request is a failed
    /// [`BatchResponse`]; only transport-level problems return `Err`.
    pub async fn fetch_batch(&self, requests: &[BatchRequest]) -> Result<Vec<BatchResponse>> {
        let mut responses = Vec::with_capacity(requests.len());

        for chunk in requests.chunks(BATCH_CHUNK_SIZE) {
            let mut url = self.api_url("/1/batch")?;
            url.set_query(Some(&format!("urls={}", encode_urls(chunk))));

            debug!(requests = chunk.len(), "Sending Trello batch");
            let builder = self.request_url(Method::GET, url)?;
            let elements: Vec<Value> = self.send_json(builder).await?;

            if elements.len() != chunk.len() {
                return Err(TrelloError::InvalidResponse(format!(
                    "batch returned {} elements for {} requests",
                    elements.len(),
                    chunk.len()
                )));
            }

            responses.extend(
                chunk
                    .iter()
                    .zip(elements)
                    .map(|(request, element)| BatchResponse::decode(request, element)),
            );
        }

        Ok(responses)
    }
}

/// Join relative URLs with commas, escaping the characters that would
/// otherwise split the `urls` parameter.
fn encode_urls(requests: &[BatchRequest]) -> String {
    requests
        .iter()
        .map(|request| {
            request
                .relative_url()
                .replace('%', "%25")
                .replace(',', "%2C")
                .replace('&', "%26")
                .replace(' ', "%20")
        })
        .collect::<Vec<_>>()
        .join(",")
}
