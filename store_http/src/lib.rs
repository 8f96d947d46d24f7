//! HTTP gateway backend for the content store.
//!
//! Talks to a web3.storage-style pinning service: `POST /upload` stores a
//! payload and returns its content identifier, `GET /content/{id}` fetches
//! it back. The service derives the identifier from the payload bytes, so
//! uploads are idempotent.

use async_trait::async_trait;
use atelier_store::{ContentStore, StoreError};
use atelier_types::ContentRef;
use serde::Deserialize;
use std::time::Duration;

/// Default request timeout for store calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`ContentStore`] backed by an HTTP content-addressing gateway.
pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    cid: String,
}

impl HttpContentStore {
    /// Create a store client for the gateway at `base_url`.
    ///
    /// `auth_token`, when present, is sent as a bearer token on every
    /// request.
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentRef, StoreError> {
        let url = format!("{}/upload", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "upload returned {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(format!("bad upload response: {e}")))?;
        tracing::debug!(cid = %body.cid, "stored payload");
        Ok(ContentRef::new(body.cid))
    }

    async fn get(&self, content_ref: &ContentRef) -> Result<Vec<u8>, StoreError> {
        let url = format!("{}/content/{}", self.base_url, content_ref);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => {
                Err(StoreError::NotFound(content_ref.to_string()))
            }
            status if status.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                Ok(bytes.to_vec())
            }
            status => Err(StoreError::Unavailable(format!(
                "fetch of {content_ref} returned {status}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = HttpContentStore::new("https://store.example/", None);
        assert_eq!(store.base_url, "https://store.example");
    }
}
