//! Hosted search index client.
//!
//! Speaks the Meilisearch REST protocol: settings, document upserts, and the
//! search endpoint with filters, pagination, and facet distribution all
//! delegated to the service.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::document::{
    BackendMode, FacetSet, SearchDocument, SearchOptions, SearchResults, FACET_FIELDS,
};
use super::{SearchBackend, SearchError};

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Document as stored in the hosted index: the article plus a numeric
/// publication timestamp for range filters.
#[derive(Debug, Serialize, Deserialize)]
struct IndexedDocument {
    #[serde(flatten)]
    document: SearchDocument,
    #[serde(rename = "publishedAtTs")]
    published_at_ts: i64,
}

#[derive(Debug, Deserialize)]
struct HostedSearchResponse {
    hits: Vec<IndexedDocument>,
    #[serde(rename = "totalHits")]
    total_hits: usize,
    #[serde(default)]
    page: usize,
    #[serde(rename = "facetDistribution")]
    facet_distribution: Option<HashMap<String, HashMap<String, u64>>>,
}

// == Hosted Index ==
#[derive(Clone)]
pub struct HostedIndex {
    http: Client,
    base_url: String,
    api_key: ApiKey,
    index_uid: String,
    timeout: Duration,
}

impl HostedIndex {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        index_uid: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: ApiKey(api_key.into()),
            index_uid: index_uid.into(),
            timeout,
        }
    }

    /// Probes the service and pushes index settings. Called once by the
    /// facade before the hosted backend is selected.
    pub async fn configure(&self) -> Result<(), SearchError> {
        let health_url = format!("{}/health", self.base_url);
        let response = self
            .http
            .get(&health_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_transport)?;
        if !response.status().is_success() {
            return Err(SearchError::Unavailable(format!(
                "health probe returned HTTP {}",
                response.status()
            )));
        }

        let settings_url = format!("{}/indexes/{}/settings", self.base_url, self.index_uid);
        let settings = json!({
            "searchableAttributes": ["title", "body"],
            "filterableAttributes": ["source", "topics", "channelName", "publishedAtTs"],
            "sortableAttributes": ["publishedAtTs"],
        });
        let response = self
            .http
            .patch(&settings_url)
            .bearer_auth(&self.api_key.0)
            .json(&settings)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_transport)?;
        if !response.status().is_success() {
            return Err(classify_status(response.status(), "settings update"));
        }

        debug!(index = %self.index_uid, "hosted index configured");
        Ok(())
    }

    /// Upserts documents into the index; used by the admin bulk reindex.
    pub async fn index(&self, documents: &[SearchDocument]) -> Result<(), SearchError> {
        let payload: Vec<IndexedDocument> = documents
            .iter()
            .map(|document| IndexedDocument {
                published_at_ts: document.published_at.timestamp(),
                document: document.clone(),
            })
            .collect();

        let url = format!("{}/indexes/{}/documents", self.base_url, self.index_uid);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key.0)
            .query(&[("primaryKey", "id")])
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_transport)?;
        if !response.status().is_success() {
            return Err(classify_status(response.status(), "document upsert"));
        }
        debug!(count = documents.len(), "upserted documents into hosted index");
        Ok(())
    }

    async fn query(&self, body: serde_json::Value) -> Result<HostedSearchResponse, SearchError> {
        let url = format!("{}/indexes/{}/search", self.base_url, self.index_uid);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key.0)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "hosted index query failed");
            return Err(classify_status(status, "search"));
        }
        response
            .json()
            .await
            .map_err(|e| SearchError::Unavailable(format!("malformed response: {e}")))
    }

    fn filter_expression(options: &SearchOptions) -> Option<String> {
        let mut clauses = Vec::new();
        if let Some(source) = &options.source {
            clauses.push(format!("source = {}", quote(source)));
        }
        if let Some(channel) = &options.channel_name {
            clauses.push(format!("channelName = {}", quote(channel)));
        }
        for topic in &options.topics {
            clauses.push(format!("topics = {}", quote(topic)));
        }
        if let Some(from) = options.date_from {
            clauses.push(format!("publishedAtTs >= {}", from.timestamp()));
        }
        if let Some(to) = options.date_to {
            clauses.push(format!("publishedAtTs <= {}", to.timestamp()));
        }
        (!clauses.is_empty()).then(|| clauses.join(" AND "))
    }
}

#[async_trait]
impl SearchBackend for HostedIndex {
    fn mode(&self) -> BackendMode {
        BackendMode::Hosted
    }

    async fn search(&self, options: &SearchOptions) -> Result<SearchResults, SearchError> {
        let mut body = json!({
            "q": options.query.as_deref().unwrap_or(""),
            "page": options.page.max(1),
            "hitsPerPage": options.hits_per_page.max(1),
        });
        if let Some(filter) = Self::filter_expression(options) {
            body["filter"] = json!(filter);
        }

        let response = self.query(body).await?;
        Ok(SearchResults {
            hits: response.hits.into_iter().map(|h| h.document).collect(),
            total_count: response.total_hits,
            page: response.page.max(1),
        })
    }

    async fn facets(&self) -> Result<FacetSet, SearchError> {
        let body = json!({
            "q": "",
            "hitsPerPage": 1,
            "facets": FACET_FIELDS,
        });
        let response = self.query(body).await?;
        Ok(response.facet_distribution.unwrap_or_default())
    }
}

/// Quotes a user-supplied value for a filter expression.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn classify_transport(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout
    } else {
        SearchError::Unavailable(err.to_string())
    }
}

fn classify_status(status: StatusCode, operation: &str) -> SearchError {
    SearchError::Unavailable(format!("{operation} returned HTTP {status}"))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn options() -> SearchOptions {
        SearchOptions {
            page: 1,
            hits_per_page: 10,
            ..Default::default()
        }
    }

    #[test]
    fn filter_expression_joins_clauses_conjunctively() {
        let mut opts = options();
        opts.source = Some("wire".to_string());
        opts.topics = vec!["strike".to_string(), "labor".to_string()];
        opts.date_from = Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap());

        let filter = HostedIndex::filter_expression(&opts).unwrap();
        assert_eq!(
            filter,
            format!(
                "source = \"wire\" AND topics = \"strike\" AND topics = \"labor\" AND publishedAtTs >= {}",
                Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap().timestamp()
            )
        );
    }

    #[test]
    fn filter_expression_empty_when_no_filters() {
        assert!(HostedIndex::filter_expression(&options()).is_none());
    }

    #[test]
    fn quote_escapes_embedded_quotes() {
        assert_eq!(quote(r#"say "no""#), r#""say \"no\"""#);
        assert_eq!(quote(r"back\slash"), r#""back\\slash""#);
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HostedIndex {
        HostedIndex::new(
            Client::new(),
            server.uri(),
            "test-key",
            "articles",
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn search_parses_hits_and_total() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/articles/search"))
            .and(body_partial_json(serde_json::json!({"q": "strike"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hits": [{
                    "id": "a1",
                    "title": "General strike begins",
                    "body": "Second week",
                    "source": "wire",
                    "topics": ["strike"],
                    "channelName": "labor",
                    "publishedAt": "2026-05-02T08:30:00Z",
                    "publishedAtTs": 1777710600i64
                }],
                "totalHits": 12,
                "page": 1
            })))
            .mount(&server)
            .await;

        let mut opts = SearchOptions {
            page: 1,
            hits_per_page: 10,
            ..Default::default()
        };
        opts.query = Some("strike".to_string());

        let results = client(&server).search(&opts).await.unwrap();
        assert_eq!(results.total_count, 12);
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].id, "a1");
    }

    #[tokio::test]
    async fn facets_map_distribution() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/articles/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hits": [],
                "totalHits": 3,
                "page": 1,
                "facetDistribution": {
                    "source": {"wire": 2, "gazette": 1},
                    "topics": {"strike": 2},
                    "channelName": {"labor": 3}
                }
            })))
            .mount(&server)
            .await;

        let facets = client(&server).facets().await.unwrap();
        assert_eq!(facets["source"]["wire"], 2);
        assert_eq!(facets["channelName"]["labor"], 3);
    }

    #[tokio::test]
    async fn search_5xx_reports_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/articles/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server)
            .search(&SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Unavailable(_)));
    }

    #[tokio::test]
    async fn configure_probes_health_then_pushes_settings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/indexes/articles/settings"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).configure().await.unwrap();
    }

    #[tokio::test]
    async fn configure_fails_when_service_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).configure().await.unwrap_err();
        assert!(matches!(err, SearchError::Unavailable(_)));
    }

    #[tokio::test]
    async fn index_upserts_documents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/articles/documents"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "taskUid": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let document = SearchDocument {
            id: "a1".to_string(),
            title: "March downtown".to_string(),
            body: "Thousands gathered".to_string(),
            source: "wire".to_string(),
            topics: vec!["protest".to_string()],
            channel_name: "city".to_string(),
            published_at: chrono::Utc::now(),
        };
        client(&server).index(&[document]).await.unwrap();
    }
}
