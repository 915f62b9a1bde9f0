//! HTTP client for the hosted store's PostgREST endpoint.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_RANGE};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{Query, RowStore, StoreError};

/// Environment variable holding the store's base URL.
pub const URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the anonymous access key.
pub const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Longest slice of an error body kept in [`StoreError::Api`].
const MAX_ERROR_BODY: usize = 200;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Where the store lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: Url,
    pub anon_key: String,
}

impl StoreConfig {
    /// Validate an explicit endpoint and key.
    pub fn new(url: &str, anon_key: impl Into<String>) -> Result<Self, StoreError> {
        let parsed = Url::parse(url)
            .map_err(|e| StoreError::Config(format!("invalid store url {url:?}: {e}")))?;

        let anon_key = anon_key.into();
        if anon_key.trim().is_empty() {
            return Err(StoreError::Config("anon key is empty".to_owned()));
        }

        Ok(Self {
            url: parsed,
            anon_key,
        })
    }

    /// Read [`URL_ENV`] and [`ANON_KEY_ENV`].  Either one missing is an error.
    pub fn from_env() -> Result<Self, StoreError> {
        let url = required_env(URL_ENV)?;
        let anon_key = required_env(ANON_KEY_ENV)?;
        Self::new(&url, anon_key)
    }

    /// REST endpoint of `table`.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url.as_str().trim_end_matches('/'), table)
    }
}

fn required_env(name: &str) -> Result<String, StoreError> {
    std::env::var(name)
        .map_err(|_| StoreError::Config(format!("{name} environment variable not set")))
}

// ---------------------------------------------------------------------------
// HttpStore
// ---------------------------------------------------------------------------

/// [`RowStore`] backed by the hosted store's REST interface.
///
/// Cloning is cheap; the underlying connection handling is shared.
#[derive(Debug, Clone)]
pub struct HttpStore {
    http: Client,
    config: StoreConfig,
}

impl HttpStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    /// Build a client from [`StoreConfig::from_env`].
    pub fn from_env() -> Result<Self, StoreError> {
        Self::new(StoreConfig::from_env()?)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn request(&self, method: Method, table: &str, params: &[(String, String)]) -> RequestBuilder {
        self.http
            .request(method, self.config.table_url(table))
            .query(params)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
            .header(ACCEPT, "application/json")
    }
}

#[async_trait]
impl RowStore for HttpStore {
    #[instrument(skip(self, query), fields(table = %query.table))]
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let params = query.to_params();
        debug!("GET {} {:?}", query.table, params);

        let response = self.request(Method::GET, &query.table, &params).send().await?;
        let response = ensure_success(response).await?;

        let rows: Vec<Value> = response.json().await?;
        debug!("received {} rows", rows.len());
        Ok(rows)
    }

    #[instrument(skip(self, query), fields(table = %query.table))]
    async fn count(&self, query: &Query) -> Result<u64, StoreError> {
        let params = query.count_params();
        debug!("HEAD {} {:?}", query.table, params);

        let response = self
            .request(Method::HEAD, &query.table, &params)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let header = response
            .headers()
            .get(CONTENT_RANGE)
            .ok_or_else(|| StoreError::ContentRange("missing".to_owned()))?
            .to_str()
            .map_err(|e| StoreError::ContentRange(e.to_string()))?;

        parse_content_range(header)
    }
}

/// Turn a non-2xx response into [`StoreError::Api`].
async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// PostgREST reports errors as `{"message": ...}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect())
}

/// Extract the total from a `Content-Range` header such as `0-24/573` or
/// `*/0`.
pub fn parse_content_range(header: &str) -> Result<u64, StoreError> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| StoreError::ContentRange(header.to_owned()))
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_with_rows() {
        assert_eq!(parse_content_range("0-24/573").unwrap(), 573);
    }

    #[test]
    fn content_range_without_rows() {
        assert_eq!(parse_content_range("*/0").unwrap(), 0);
    }

    #[test]
    fn content_range_with_unknown_total_is_rejected() {
        assert!(matches!(
            parse_content_range("0-24/*"),
            Err(StoreError::ContentRange(h)) if h == "0-24/*"
        ));
        assert!(parse_content_range("garbage").is_err());
    }

    #[test]
    fn table_url_joins_base_and_table() {
        let config = StoreConfig::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(
            config.table_url("invoices"),
            "https://abc.supabase.co/rest/v1/invoices"
        );
    }

    #[test]
    fn invalid_url_is_a_config_error() {
        assert!(matches!(
            StoreConfig::new("not a url", "key"),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn blank_key_is_a_config_error() {
        assert!(matches!(
            StoreConfig::new("https://abc.supabase.co", "  "),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn missing_environment_fails_construction() {
        std::env::remove_var(URL_ENV);
        std::env::remove_var(ANON_KEY_ENV);
        assert!(matches!(
            HttpStore::from_env(),
            Err(StoreError::Config(msg)) if msg.contains(URL_ENV)
        ));
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"code":"42P01","message":"relation does not exist"}"#),
            "relation does not exist"
        );
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
    }
}
