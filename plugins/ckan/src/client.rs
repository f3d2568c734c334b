//! Datastore search API client.
//!
//! The source only needs one remote operation, `datastore_search`. It is
//! modelled as the [`DatastoreClient`] trait so the HTTP transport can be
//! swapped out (tests use an in-memory client).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;
use url::Url;
use vizkit_plugin_protocol::{DataFilters, Field, Record, SourceError, SourceResult};

const DATASTORE_SEARCH_PATH: &str = "api/3/action/datastore_search";

/// Parameters of one `datastore_search` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub id: String,
    pub limit: usize,
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Map<String, JsonValue>>,
}

impl SearchQuery {
    pub fn new(id: impl Into<String>, limit: usize, offset: usize, filters: &DataFilters) -> Self {
        Self {
            id: id.into(),
            limit,
            offset,
            q: filters.q.clone(),
            filters: filters.filters.clone(),
        }
    }

    /// Query string parameters. `filters` travels as a JSON document.
    pub fn query_pairs(&self) -> SourceResult<Vec<(&'static str, String)>> {
        let mut pairs = vec![
            ("id", self.id.clone()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(filters) = &self.filters {
            pairs.push(("filters", serde_json::to_string(filters)?));
        }
        Ok(pairs)
    }
}

/// The `result` object of a successful search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    success: bool,
    #[serde(default)]
    result: Option<SearchResult>,
    #[serde(default)]
    error: Option<JsonValue>,
}

/// Remote tabular data API.
#[async_trait]
pub trait DatastoreClient: Send + Sync {
    async fn datastore_search(&self, query: &SearchQuery) -> SourceResult<SearchResult>;
}

/// [`DatastoreClient`] talking to a CKAN portal over HTTP.
pub struct HttpDatastoreClient {
    base_url: Url,
    client: Client,
}

impl HttpDatastoreClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: Url, client: Client) -> Self {
        Self { base_url, client }
    }

    fn endpoint(&self) -> SourceResult<Url> {
        self.base_url
            .join(DATASTORE_SEARCH_PATH)
            .map_err(|e| SourceError::InvalidResource(format!("{}: {}", self.base_url, e)))
    }
}

#[async_trait]
impl DatastoreClient for HttpDatastoreClient {
    async fn datastore_search(&self, query: &SearchQuery) -> SourceResult<SearchResult> {
        let endpoint = self.endpoint()?;
        debug!(url = %endpoint, id = %query.id, limit = query.limit, offset = query.offset, "datastore_search");

        let response = self
            .client
            .get(endpoint.clone())
            .query(&query.query_pairs()?)
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("request to {} failed: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!(
                "{} returned HTTP {}",
                endpoint, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(format!("failed to read response from {}: {}", endpoint, e)))?;

        parse_search_response(&body)
    }
}

fn parse_search_response(body: &str) -> SourceResult<SearchResult> {
    let response: SearchResponse = serde_json::from_str(body)?;

    if !response.success {
        let reason = response
            .error
            .map(|error| error.to_string())
            .unwrap_or_else(|| "no error details".to_string());
        return Err(SourceError::Transport(format!("datastore_search failed: {}", reason)));
    }

    response
        .result
        .ok_or_else(|| SourceError::Parse("datastore_search response has no result".to_string()))
}
