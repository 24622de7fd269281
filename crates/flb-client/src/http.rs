use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use flb_crypto::SignedUpdate;
use flb_types::{ChunkRef, FeedIndex, FeedUpdate, OwnerId, Stamp, Topic};

use crate::api::{PublishReceipt, StorageNode, TagStatus};
use crate::endpoint::{endpoints, feed_path, tag_path};
use crate::error::{ClientError, ClientResult};

/// Header carrying the postage stamp on publish requests.
const STAMP_HEADER: &str = "x-postage-stamp";

/// HTTP client for one storage node.
#[derive(Clone, Debug)]
pub struct HttpNode {
    base_url: String,
    label: String,
    client: reqwest::Client,
}

impl HttpNode {
    /// Connect to the node at `base_url` (scheme + host + port, no path).
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Connect with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            label: base_url.clone(),
            base_url,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response to the client error taxonomy.
    async fn reject(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        match status.as_u16() {
            404 => ClientError::NotFound,
            409 => ClientError::Conflict,
            402 => ClientError::StampExhausted,
            401 | 403 => ClientError::Unauthorized(message),
            code => ClientError::Node {
                status: code,
                message,
            },
        }
    }
}

#[derive(Serialize)]
struct ManifestRequest {
    owner: String,
    topic: String,
}

#[derive(Deserialize)]
struct ManifestResponse {
    reference: String,
}

#[derive(Serialize)]
struct PublishRequest {
    index: u64,
    payload: String,
    public_key: String,
    signature: String,
}

#[derive(Deserialize)]
struct PublishResponse {
    reference: String,
    #[serde(default)]
    tag: Option<u64>,
}

#[derive(Deserialize)]
struct LookupResponse {
    index: u64,
    payload: String,
}

fn parse_ref(hex_str: &str) -> ClientResult<ChunkRef> {
    ChunkRef::from_hex(hex_str).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl StorageNode for HttpNode {
    async fn create_manifest(
        &self,
        stamp: &Stamp,
        owner: &OwnerId,
        topic: &Topic,
    ) -> ClientResult<ChunkRef> {
        let body = ManifestRequest {
            owner: owner.to_hex(),
            topic: topic.to_hex(),
        };
        let response = self
            .client
            .post(self.url(endpoints::MANIFESTS))
            .header(STAMP_HEADER, stamp.as_str())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        let manifest: ManifestResponse = response.json().await?;
        debug!(node = %self.label, reference = %manifest.reference, "feed manifest created");
        parse_ref(&manifest.reference)
    }

    async fn publish(
        &self,
        stamp: &Stamp,
        topic: &Topic,
        update: &SignedUpdate,
    ) -> ClientResult<PublishReceipt> {
        let owner = OwnerId::from_public_key(&update.public_key);
        let body = PublishRequest {
            index: update.index.value(),
            payload: update.payload.to_hex(),
            public_key: hex::encode(update.public_key),
            signature: hex::encode(update.signature.to_bytes()),
        };
        let response = self
            .client
            .post(self.url(&feed_path(&owner.to_hex(), &topic.to_hex())))
            .header(STAMP_HEADER, stamp.as_str())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        let committed: PublishResponse = response.json().await?;
        debug!(
            node = %self.label,
            index = update.index.value(),
            tag = ?committed.tag,
            "update published"
        );
        Ok(PublishReceipt {
            reference: parse_ref(&committed.reference)?,
            tag: committed.tag,
        })
    }

    async fn lookup(&self, owner: &OwnerId, topic: &Topic) -> ClientResult<FeedUpdate> {
        let response = self
            .client
            .get(self.url(&feed_path(&owner.to_hex(), &topic.to_hex())))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        let latest: LookupResponse = response.json().await?;
        Ok(FeedUpdate::new(
            FeedIndex::new(latest.index),
            parse_ref(&latest.payload)?,
        ))
    }

    async fn tag_status(&self, tag: u64) -> ClientResult<TagStatus> {
        let response = self.client.get(self.url(&tag_path(tag))).send().await?;
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        Ok(response.json().await?)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let node = HttpNode::new("http://localhost:1633/").unwrap();
        assert_eq!(node.label(), "http://localhost:1633");
        assert_eq!(node.url("/v1/health"), "http://localhost:1633/v1/health");
    }

    #[test]
    fn label_is_base_url() {
        let node = HttpNode::new("http://node-a:1633").unwrap();
        assert_eq!(node.label(), "http://node-a:1633");
    }
}
