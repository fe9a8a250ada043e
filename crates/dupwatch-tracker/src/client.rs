//! REST client for the issue tracker.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use dupwatch_core::{defaults, Error, Item, ItemSearch, Result};

use crate::item::RawItem;

/// Property key marking comments authored by the scanner bot.
pub const ALERT_COMMENT_PROPERTY: &str = "dupwatch-alert";

/// Entity property flagging synthetic/demo items that must never be scanned.
pub const DEMO_ITEM_PROPERTY: &str = "dupwatch-demo-item";

/// Fields projected on every search request.
const SEARCH_FIELDS: [&str; 5] = ["summary", "description", "project", "labels", "status"];

/// Issue-tracker REST client.
pub struct TrackerClient {
    client: Client,
    base_url: String,
    user: Option<String>,
    token: Option<String>,
}

impl TrackerClient {
    /// Create a client for the given base URL, without authentication.
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::TRACKER_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        info!("Initializing tracker client: url={}", base_url);

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: None,
            token: None,
        }
    }

    /// Attach basic-auth credentials.
    pub fn with_credentials(mut self, user: String, token: String) -> Self {
        self.user = Some(user);
        self.token = Some(token);
        self
    }

    /// Create from environment variables.
    ///
    /// `DUPWATCH_TRACKER_URL` is required; `DUPWATCH_TRACKER_USER` and
    /// `DUPWATCH_TRACKER_TOKEN` enable basic auth when both are present.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("DUPWATCH_TRACKER_URL")
            .map_err(|_| Error::Config("DUPWATCH_TRACKER_URL is not set".into()))?;

        let mut client = Self::new(base_url);
        if let (Ok(user), Ok(token)) = (
            std::env::var("DUPWATCH_TRACKER_USER"),
            std::env::var("DUPWATCH_TRACKER_TOKEN"),
        ) {
            client = client.with_credentials(user, token);
        }
        Ok(client)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let (Some(user), Some(token)) = (&self.user, &self.token) {
            builder = builder.basic_auth(user, Some(token));
        }
        builder
    }

    /// Execute a query against the tracker's item corpus.
    #[instrument(skip(self, query), fields(subsystem = "tracker", component = "client", op = "search"))]
    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Item>> {
        if query.trim().is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let request = SearchRequest {
            jql: query.to_string(),
            max_results,
            fields: SEARCH_FIELDS.iter().map(|s| s.to_string()).collect(),
        };

        let response = self
            .request(reqwest::Method::POST, "/rest/api/3/search/jql")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Search(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Search(format!(
                "Tracker returned {}: {}",
                status, body
            )));
        }

        let result: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("Failed to parse response: {}", e)))?;

        let items: Vec<Item> = result.issues.into_iter().map(RawItem::normalize).collect();

        debug!(
            result_count = items.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(items)
    }

    /// Fetch a single item by key.
    #[instrument(skip(self, key), fields(subsystem = "tracker", component = "client", op = "fetch_item", item_key = %key))]
    pub async fn fetch_item(&self, key: &str) -> Result<Item> {
        if key.trim().is_empty() {
            return Err(Error::InvalidInput("item key must not be empty".into()));
        }

        let response = self
            .request(reqwest::Method::GET, &format!("/rest/api/3/issue/{key}"))
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Request(format!(
                "Could not load item {}: {}",
                key, status
            )));
        }

        let raw: RawItem = response
            .json()
            .await
            .map_err(|e| Error::Request(format!("Failed to parse item: {}", e)))?;
        Ok(raw.normalize())
    }

    /// Replace an item's labels.
    #[instrument(skip(self, key, labels), fields(subsystem = "tracker", component = "client", op = "update_labels", item_key = %key))]
    pub async fn update_labels(&self, key: &str, labels: &[String]) -> Result<()> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/rest/api/3/issue/{key}"))
            .json(&json!({"fields": {"labels": labels}}))
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Request(format!(
                "Label update for {} returned {}",
                key,
                response.status()
            )));
        }
        Ok(())
    }

    /// Post a plain-paragraph comment on an item, marked as bot-authored.
    #[instrument(skip(self, key, text), fields(subsystem = "tracker", component = "client", op = "add_comment", item_key = %key))]
    pub async fn add_comment(&self, key: &str, text: &str) -> Result<()> {
        let body = json!({
            "body": {
                "type": "doc",
                "version": 1,
                "content": [{
                    "type": "paragraph",
                    "content": [{"type": "text", "text": text}]
                }]
            },
            "properties": [{"key": ALERT_COMMENT_PROPERTY, "value": true}]
        });

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/rest/api/3/issue/{key}/comment"),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Request(format!(
                "Comment on {} returned {}",
                key,
                response.status()
            )));
        }
        Ok(())
    }

    /// Check whether an entity property exists on an item.
    ///
    /// 200 means present, 404 means absent; anything else is an error the
    /// caller may choose to ignore.
    pub async fn has_property(&self, key: &str, property: &str) -> Result<bool> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/rest/api/3/issue/{key}/properties/{property}"),
            )
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        match response.status() {
            s if s.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            s => {
                warn!(
                    subsystem = "tracker",
                    component = "client",
                    item_key = %key,
                    status = %s,
                    "Property lookup failed"
                );
                Err(Error::Request(format!("Property lookup returned {}", s)))
            }
        }
    }
}

#[derive(Serialize)]
struct SearchRequest {
    jql: String,
    #[serde(rename = "maxResults")]
    max_results: u32,
    fields: Vec<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<RawItem>,
}

#[async_trait]
impl ItemSearch for TrackerClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Item>> {
        TrackerClient::search(self, query, max_results).await
    }
}
