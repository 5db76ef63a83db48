//! Lookup clients.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::response::{parse_lookup_response, FoodMatch, LookupError, LookupResult, NutritionFacts};

/// Default CalorieNinjas nutrition endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.calorieninjas.com/v1/nutrition";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Source of nutrition facts for free-text food queries.
#[async_trait]
pub trait NutritionLookup: Send + Sync {
    /// Look up a free-text query. An empty vector means "no results", not failure.
    async fn lookup(&self, query: &str) -> LookupResult<Vec<FoodMatch>>;
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl LookupConfig {
    /// Settings for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for a CalorieNinjas-compatible `/nutrition` endpoint.
pub struct CalorieNinjasClient {
    client: Client,
    config: LookupConfig,
}

impl CalorieNinjasClient {
    /// Build a client. Fails only if the TLS backend cannot be initialised.
    pub fn new(config: LookupConfig) -> LookupResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LookupError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Full request URL for a query.
    pub fn request_url(&self, query: &str) -> String {
        format!(
            "{}?query={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl NutritionLookup for CalorieNinjasClient {
    #[instrument(skip(self), fields(service = "nutrition_lookup"))]
    async fn lookup(&self, query: &str) -> LookupResult<Vec<FoodMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let response = self
            .client
            .get(self.request_url(query))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                warn!("Nutrition lookup request failed: {e}");
                LookupError::Http(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Nutrition lookup returned status {status}");
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Http(e.to_string()))?;
        let items = parse_lookup_response(&body)?;
        debug!(count = items.len(), "Nutrition lookup decoded");

        Ok(items.iter().map(NutritionFacts::to_food_match).collect())
    }
}

/// In-memory lookup keyed by exact (case-insensitive) query.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    foods: HashMap<String, Vec<NutritionFacts>>,
    unavailable: bool,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// A lookup that always fails as if the service were unreachable.
    pub fn unavailable() -> Self {
        Self {
            foods: HashMap::new(),
            unavailable: true,
        }
    }

    /// Register the items returned for a query.
    pub fn with_food(mut self, query: &str, facts: NutritionFacts) -> Self {
        self.foods
            .entry(query.trim().to_lowercase())
            .or_default()
            .push(facts);
        self
    }
}

#[async_trait]
impl NutritionLookup for StaticLookup {
    async fn lookup(&self, query: &str) -> LookupResult<Vec<FoodMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }
        if self.unavailable {
            return Err(LookupError::Http("lookup service unavailable".into()));
        }

        Ok(self
            .foods
            .get(&query.to_lowercase())
            .map(|items| items.iter().map(NutritionFacts::to_food_match).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single request with `status` and `body`. The handle yields the raw request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/v1/nutrition"), handle)
    }

    fn client_for(base_url: String) -> CalorieNinjasClient {
        let mut config = LookupConfig::new("secret-key");
        config.base_url = base_url;
        config.timeout = Duration::from_secs(5);
        CalorieNinjasClient::new(config).unwrap()
    }

    fn apple() -> NutritionFacts {
        NutritionFacts {
            name: "apple".into(),
            serving_size_g: 100.0,
            calories: 52.0,
            protein_g: 0.3,
            carbohydrates_total_g: 13.8,
            fat_total_g: 0.2,
        }
    }

    #[test]
    fn test_request_url_encodes_query() {
        let client = CalorieNinjasClient::new(LookupConfig::new("key")).unwrap();
        assert_eq!(
            client.request_url("1 large apple"),
            "https://api.calorieninjas.com/v1/nutrition?query=1%20large%20apple"
        );
    }

    #[test]
    fn test_request_url_trims_trailing_slash() {
        let mut config = LookupConfig::new("key");
        config.base_url = "http://localhost:8080/v1/nutrition/".into();
        let client = CalorieNinjasClient::new(config).unwrap();
        assert_eq!(
            client.request_url("rice"),
            "http://localhost:8080/v1/nutrition?query=rice"
        );
    }

    #[tokio::test]
    async fn test_blank_query_skips_request() {
        let client = CalorieNinjasClient::new(LookupConfig::new("key")).unwrap();
        let result = client.lookup("   ").await;
        assert!(matches!(result, Err(LookupError::EmptyQuery)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        let mut config = LookupConfig::new("key");
        config.base_url = "http://127.0.0.1:1/v1/nutrition".into();
        config.timeout = Duration::from_secs(2);
        let client = CalorieNinjasClient::new(config).unwrap();

        let result = client.lookup("apple").await;
        assert!(matches!(result, Err(LookupError::Http(_))));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (base_url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;

        let result = client_for(base_url).lookup("apple").await;
        assert!(matches!(result, Err(LookupError::Status(500))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_request_carries_key_and_query() {
        let (base_url, server) = serve_once("200 OK", r#"{"items":[]}"#).await;

        let result = client_for(base_url).lookup("1 large apple").await.unwrap();
        assert!(result.is_empty());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v1/nutrition?query=1%20large%20apple HTTP/1.1"));
        assert!(request.to_lowercase().contains("x-api-key: secret-key"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let (base_url, server) = serve_once("200 OK", r#"{"results":[]}"#).await;

        let result = client_for(base_url).lookup("apple").await;
        assert!(matches!(result, Err(LookupError::MalformedResponse(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_static_lookup() {
        let lookup = StaticLookup::new().with_food("Apple", apple());

        let found = lookup.lookup("apple").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label, "100g apple");
        assert_eq!(found[0].carbs, 14);

        let missing = lookup.lookup("durian").await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_static_lookup_unavailable() {
        let lookup = StaticLookup::unavailable();
        assert!(matches!(
            lookup.lookup("apple").await,
            Err(LookupError::Http(_))
        ));
    }
}
