//! REST client for the content tree endpoints.
//!
//! [`RestLocationLoader`] implements [`LocationLoader`] against the
//! repository's REST API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `load_location_items` | `GET {base}/api/ezp/v2/location/tree/load-subitems/{parent}/{limit}/{offset}` |
//! | `load_subtree` | `POST {base}/api/ezp/v2/location/tree/load-subtree` |
//!
//! # Error Handling
//!
//! Transport failures, non-2xx statuses and undecodable bodies map onto
//! [`LoadError`]. Requests are sent once: there is no retry and no request
//! timeout beyond the connect timeout, so a failed fetch simply leaves the
//! tree where it was.

mod wire;

use std::time::Duration;

use content_tree_core::{LoadError, LocationLoader};
use content_tree_types::{ItemNode, LocationId, RestInfo, Subtree};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::wire::{LoadSubitemsResponse, LoadSubtreeRequestBody, LoadSubtreeResponse};

pub use content_tree_core;

pub const LOAD_SUBITEMS_ENDPOINT: &str = "/api/ezp/v2/location/tree/load-subitems";
pub const LOAD_SUBTREE_ENDPOINT: &str = "/api/ezp/v2/location/tree/load-subtree";

const CONTENT_TREE_NODE_ACCEPT: &str = "application/vnd.ez.api.ContentTreeNode+json";
const CONTENT_TREE_ROOT_ACCEPT: &str = "application/vnd.ez.api.ContentTreeRoot+json";
const LOAD_SUBTREE_CONTENT_TYPE: &str = "application/vnd.ez.api.ContentTreeLoadSubtreeRequest+json";

const SITEACCESS_HEADER: &str = "X-Siteaccess";
const CSRF_TOKEN_HEADER: &str = "X-CSRF-Token";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
}

#[derive(Debug, Clone)]
pub struct RestLocationLoader {
    client: reqwest::Client,
    base_url: String,
}

impl RestLocationLoader {
    /// Loader for the repository at `base_url` (scheme and host, optionally a path prefix).
    pub fn new(base_url: impl Into<String>) -> Result<Self, LoadError> {
        let client = base_client_builder().build().map_err(transport_error)?;
        Ok(Self::with_client(client, base_url))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }
}

impl LocationLoader for RestLocationLoader {
    async fn load_location_items(
        &self,
        rest_info: &RestInfo,
        parent_location_id: LocationId,
        limit: u32,
        offset: u32,
    ) -> Result<ItemNode, LoadError> {
        let url = format!(
            "{}/{parent_location_id}/{limit}/{offset}",
            self.url(LOAD_SUBITEMS_ENDPOINT)
        );
        tracing::debug!(%url, "Loading subitems");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, CONTENT_TREE_NODE_ACCEPT)
            .header(SITEACCESS_HEADER, &rest_info.siteaccess)
            .send()
            .await
            .map_err(transport_error)?;

        let body: LoadSubitemsResponse = decode_response(response).await?;
        Ok(ItemNode::from(body.node))
    }

    async fn load_subtree(
        &self,
        rest_info: &RestInfo,
        subtree: &Subtree,
    ) -> Result<Vec<ItemNode>, LoadError> {
        let body = serde_json::to_vec(&LoadSubtreeRequestBody::new(subtree))
            .map_err(|e| LoadError::Decode(format!("failed to encode subtree: {e}")))?;
        tracing::debug!(bytes = body.len(), "Loading subtree");

        let response = self
            .client
            .post(self.url(LOAD_SUBTREE_ENDPOINT))
            .header(ACCEPT, CONTENT_TREE_ROOT_ACCEPT)
            .header(CONTENT_TYPE, LOAD_SUBTREE_CONTENT_TYPE)
            .header(SITEACCESS_HEADER, &rest_info.siteaccess)
            .header(CSRF_TOKEN_HEADER, &rest_info.token)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let body: LoadSubtreeResponse = decode_response(response).await?;
        Ok(body.root.nodes.into_iter().map(ItemNode::from).collect())
    }
}

fn transport_error(err: reqwest::Error) -> LoadError {
    LoadError::Transport(err.to_string())
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, LoadError> {
    let status = response.status();
    if !status.is_success() {
        let body = read_capped_error_body(response).await;
        return Err(LoadError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| LoadError::Decode(e.to_string()))
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let loader = RestLocationLoader::with_client(reqwest::Client::new(), "https://cms.test/");
        assert_eq!(loader.base_url(), "https://cms.test");
        assert_eq!(
            loader.url(LOAD_SUBTREE_ENDPOINT),
            "https://cms.test/api/ezp/v2/location/tree/load-subtree"
        );
    }
}
