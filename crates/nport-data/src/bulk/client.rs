//! Unsigned S3 access to the bulk N-PORT mirror.

use crate::bulk::listing::ListBucketPage;
use crate::edgar::EdgarConfig;
use crate::error::{DataError, Result};
use reqwest::Url;

/// Client for listing and downloading bulk objects.
///
/// The bucket is public, so requests are plain unsigned HTTP calls against the
/// bucket endpoint. No request spacing is applied: a bulk scan issues few,
/// large requests.
pub struct BulkClient {
    client: reqwest::Client,
    endpoint: String,
}

impl BulkClient {
    /// Create a client for the endpoint in `config`.
    pub fn new(config: &EdgarConfig) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            endpoint: config.bulk_endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// List every key under `prefix` ending in `suffix`, sorted.
    ///
    /// Follows continuation tokens until the listing is exhausted.
    pub async fn list_keys(&self, prefix: &str, suffix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let response = {
                let mut query = vec![("list-type", "2"), ("prefix", prefix)];
                if let Some(t) = token.as_deref() {
                    query.push(("continuation-token", t));
                }
                self.client
                    .get(format!("{}/", self.endpoint))
                    .query(&query)
                    .send()
                    .await?
            };

            if !response.status().is_success() {
                return Err(DataError::Http(format!(
                    "Failed to list {}: HTTP {}",
                    prefix,
                    response.status()
                )));
            }

            let page = ListBucketPage::parse(&response.text().await?)?;
            tracing::debug!(keys = page.keys.len(), truncated = page.is_truncated, "listed page");
            keys.extend(page.keys.into_iter().filter(|k| k.ends_with(suffix)));

            match page.next_continuation_token {
                Some(next) if page.is_truncated => token = Some(next),
                _ => break,
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Download an object's raw bytes.
    pub async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let url = self.object_url(key)?;
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "Failed to fetch {}: HTTP {}",
                key,
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// URL of `key`, each path segment percent-encoded.
    fn object_url(&self, key: &str) -> Result<Url> {
        let invalid = || DataError::Parse(format!("invalid bulk endpoint: {}", self.endpoint));

        let mut url = Url::parse(&self.endpoint).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(key.split('/'));
        Ok(url)
    }
}

impl std::fmt::Debug for BulkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
