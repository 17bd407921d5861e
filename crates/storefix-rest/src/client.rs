//! REST client implementation.

use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{PatchOutcome, REST_PREFIX, RestError, SHOP_TABLE, Shop, ShopId, ShopPatch};

/// Connection settings for the shop collection.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project URL, with or without the `/rest/v1` suffix.
    pub base_url: String,
    /// Table exposing the shop rows.
    pub table: String,
    /// Value of the `apikey` header.
    pub api_key: String,
    /// Bearer token; falls back to the API key when unset.
    pub bearer_token: Option<String>,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            table: SHOP_TABLE.to_string(),
            api_key: api_key.into(),
            bearer_token: None,
        }
    }
}

/// Bounded retry for the collection fetch.
///
/// Patches are never retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_interval,
            initial_interval: self.initial_interval,
            max_interval: self.max_interval,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// No retries; a single failed fetch is final.
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
        }
    }
}

/// Client for the shop collection.
pub struct RestClient {
    http: Client,
    collection_url: String,
    table: String,
    api_key: String,
    bearer_token: String,
    retry: RetryPolicy,
}

impl RestClient {
    /// Create a new client from connection settings.
    pub fn new(config: RestConfig) -> Result<Self, RestError> {
        let base = config.base_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(RestError::Config("REST URL is empty".to_string()));
        }
        if config.api_key.is_empty() {
            return Err(RestError::Config("API key is empty".to_string()));
        }
        if config.table.is_empty() {
            return Err(RestError::Config("table name is empty".to_string()));
        }

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        let root = if base.ends_with(REST_PREFIX) {
            base.to_string()
        } else {
            format!("{}{}", base, REST_PREFIX)
        };

        let bearer_token = config
            .bearer_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| config.api_key.clone());

        Ok(Self {
            http,
            collection_url: format!("{}/{}", root, config.table),
            table: config.table,
            api_key: config.api_key,
            bearer_token,
            retry: RetryPolicy::default(),
        })
    }

    /// Set the retry policy used by [`RestClient::list_records`].
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of the collection resource.
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// Name of the table this client reads and writes.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.bearer_token))
    }

    /// Fetch every shop in the collection, in server order.
    ///
    /// Transient failures are retried according to the configured
    /// [`RetryPolicy`]; anything else is returned immediately.
    pub async fn list_records(&self) -> Result<Vec<Shop>, RestError> {
        let mut backoff = self.retry.backoff();
        let mut attempt = 0;

        loop {
            match self.fetch_collection().await {
                Ok(shops) => {
                    debug!(table = %self.table, count = shops.len(), "fetched collection");
                    return Ok(shops);
                }
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let wait = backoff.next_backoff().unwrap_or(self.retry.max_interval);
                    warn!(
                        attempt,
                        backoff_ms = wait.as_millis() as u64,
                        error = %e,
                        "transient error in list_records, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_collection(&self) -> Result<Vec<Shop>, RestError> {
        let response = self
            .authorized(self.http.get(&self.collection_url))
            .header("Accept", "application/json")
            .query(&[("select", "*")])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(RestError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_collection(&text)
    }

    /// Send a partial update for the shop with the given id.
    ///
    /// Any 2xx answer is a success. Other statuses are returned as
    /// [`PatchOutcome::Failure`] with the raw body; only transport failures
    /// are errors.
    pub async fn patch_record(
        &self,
        id: &ShopId,
        patch: &ShopPatch,
    ) -> Result<PatchOutcome, RestError> {
        debug!(id = %id, fields = ?patch.field_names(), "patching shop");

        let response = self
            .authorized(self.http.patch(&self.collection_url))
            .header("Prefer", "return=minimal")
            .query(&[("id", format!("eq.{}", id))])
            .json(patch)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(PatchOutcome::Success {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to read patch response body");
            String::new()
        });

        Ok(PatchOutcome::Failure {
            status: status.as_u16(),
            body,
        })
    }
}

/// Decode the collection body row by row.
///
/// The body must be a JSON array. Rows that do not decode as a [`Shop`] are
/// skipped with a warning so one malformed tenant cannot block the others.
fn decode_collection(text: &str) -> Result<Vec<Shop>, RestError> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let total = rows.len();

    let shops: Vec<Shop> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let id = row
                .get("id")
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<missing>".to_string());
            match serde_json::from_value::<Shop>(row) {
                Ok(shop) => Some(shop),
                Err(e) => {
                    warn!(index, id = %id, error = %e, "skipping undecodable shop row");
                    None
                }
            }
        })
        .collect();

    if shops.len() < total {
        warn!(
            skipped = total - shops.len(),
            total, "some shop rows could not be decoded"
        );
    }

    Ok(shops)
}
