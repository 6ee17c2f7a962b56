//! Embedder backed by an OpenAI-compatible embeddings endpoint.
//!
//! Supports the public OpenAI API and Azure OpenAI deployments. Requests are
//! blocking; the cache calls the embedder synchronously.
//!
//! Authentication or availability failures never reach the caller: the
//! embedder logs a warning and returns zero vectors of the configured width.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use memory_types::EmbeddingSettings;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Vector width of text-embedding-ada-002.
pub const ADA_002_DIMENSION: usize = 1536;

/// Azure deployment routing.
#[derive(Debug, Clone)]
pub struct AzureDeployment {
    /// Deployment serving the embedding model
    pub deployment_id: String,
    /// REST API version (e.g., "2023-05-15")
    pub api_version: String,
}

/// Configuration for the OpenAI embedder.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (ignored by Azure, where the deployment picks the model)
    pub model: String,

    /// API key. `None` means every call takes the zero-vector fallback.
    pub api_key: Option<SecretString>,

    /// Width of the vectors the model returns
    pub dimension: usize,

    /// Request timeout
    pub timeout: Duration,

    /// Azure routing, when set
    pub azure: Option<AzureDeployment>,
}

impl OpenAiEmbedderConfig {
    /// Create config for the OpenAI API with text-embedding-ada-002.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-ada-002".to_string(),
            api_key: Some(SecretString::from(api_key.into())),
            dimension: ADA_002_DIMENSION,
            timeout: Duration::from_secs(30),
            azure: None,
        }
    }

    /// Create config for an Azure OpenAI deployment.
    pub fn azure(
        base_url: impl Into<String>,
        deployment_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            azure: Some(AzureDeployment {
                deployment_id: deployment_id.into(),
                api_version: "2023-05-15".to_string(),
            }),
            ..Self::openai(api_key)
        }
    }

    /// Build from loaded settings.
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        let azure = if settings.use_azure {
            settings
                .azure_deployment_id
                .clone()
                .map(|deployment_id| AzureDeployment {
                    deployment_id,
                    api_version: settings.azure_api_version.clone(),
                })
        } else {
            None
        };

        Self {
            base_url: settings.api_base_url.clone(),
            model: settings.model.clone(),
            api_key: settings
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
            dimension: settings.dimension,
            timeout: Duration::from_secs(settings.timeout_secs),
            azure,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Embedder calling an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: Client,
    config: OpenAiEmbedderConfig,
    info: ModelInfo,
}

impl OpenAiEmbedder {
    /// Create a new embedder.
    pub fn new(config: OpenAiEmbedderConfig) -> Result<Self, EmbeddingError> {
        if config.dimension == 0 {
            return Err(EmbeddingError::Config("dimension must be > 0".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        let info = ModelInfo {
            name: config
                .azure
                .as_ref()
                .map(|a| a.deployment_id.clone())
                .unwrap_or_else(|| config.model.clone()),
            dimension: config.dimension,
        };

        Ok(Self {
            client,
            config,
            info,
        })
    }

    /// Build an embedder from loaded settings.
    ///
    /// Settings are validated first, so `use_azure` without a deployment is
    /// rejected rather than routed to the OpenAI endpoint.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self, EmbeddingError> {
        settings.validate().map_err(EmbeddingError::Config)?;
        Self::new(OpenAiEmbedderConfig::from_settings(settings))
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match &self.config.azure {
            Some(azure) => format!(
                "{}/openai/deployments/{}/embeddings?api-version={}",
                base, azure.deployment_id, azure.api_version
            ),
            None => format!("{}/embeddings", base),
        }
    }

    /// Single request for all inputs; vectors come back in input order.
    fn request(&self, inputs: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::MissingCredentials)?;

        let body = EmbeddingRequest {
            input: inputs,
            model: match self.config.azure {
                Some(_) => None,
                None => Some(self.config.model.as_str()),
            },
        };

        let request = self.client.post(self.endpoint()).json(&body);
        let request = match self.config.azure {
            Some(_) => request.header("api-key", api_key.expose_secret()),
            None => request.bearer_auth(api_key.expose_secret()),
        };

        let response = request.send().map_err(|e| {
            if e.is_builder() {
                EmbeddingError::Config(e.to_string())
            } else {
                EmbeddingError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EmbeddingError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if status.is_server_error() {
            return Err(EmbeddingError::Unavailable(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| EmbeddingError::Parse(e.to_string()))?;

        if parsed.data.len() != inputs.len() {
            return Err(EmbeddingError::Parse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed
            .data
            .into_iter()
            .map(|d| Embedding::new(d.embedding))
            .collect())
    }
}

/// Line breaks degrade embedding quality; submit them as spaces.
fn normalize_input(text: &str) -> String {
    text.replace('\n', " ")
}

impl EmbeddingModel for OpenAiEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Parse("empty embedding response".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let inputs: Vec<String> = texts.iter().map(|t| normalize_input(t)).collect();
        debug!(count = inputs.len(), model = %self.info.name, "Requesting embeddings");

        match self.request(&inputs) {
            Ok(embeddings) => Ok(embeddings),
            Err(e) if e.is_fallback_trigger() => {
                warn!(
                    error = %e,
                    dim = self.config.dimension,
                    "Embedding service unavailable, using zero vectors"
                );
                Ok(vec![Embedding::zeros(self.config.dimension); texts.len()])
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> OpenAiEmbedderConfig {
        OpenAiEmbedderConfig::openai("sk-test")
            .with_base_url(base_url)
            .with_dimension(3)
            .with_timeout(Duration::from_secs(5))
    }

    /// The blocking client must be created and dropped off the async runtime.
    async fn embed_blocking(
        config: OpenAiEmbedderConfig,
        texts: Vec<&'static str>,
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        tokio::task::spawn_blocking(move || {
            let embedder = OpenAiEmbedder::new(config)?;
            embedder.embed_batch(&texts)
        })
        .await
        .unwrap()
    }

    #[test]
    fn test_normalize_input() {
        assert_eq!(normalize_input("line one\nline two\n"), "line one line two ");
    }

    #[test]
    fn test_from_settings() {
        let settings = EmbeddingSettings {
            api_key: Some("sk-abc".to_string()),
            use_azure: true,
            azure_deployment_id: Some("ada-prod".to_string()),
            ..Default::default()
        };
        let config = OpenAiEmbedderConfig::from_settings(&settings);
        assert_eq!(config.dimension, 1536);
        assert_eq!(config.api_key.unwrap().expose_secret(), "sk-abc");
        assert_eq!(config.azure.unwrap().deployment_id, "ada-prod");
    }

    #[test]
    fn test_from_settings_azure_requires_deployment() {
        let settings = EmbeddingSettings {
            api_key: Some("sk-abc".to_string()),
            use_azure: true,
            azure_deployment_id: None,
            ..Default::default()
        };
        assert!(matches!(
            OpenAiEmbedder::from_settings(&settings),
            Err(EmbeddingError::Config(_))
        ));

        let blank = EmbeddingSettings {
            azure_deployment_id: Some("  ".to_string()),
            ..settings
        };
        assert!(matches!(
            OpenAiEmbedder::from_settings(&blank),
            Err(EmbeddingError::Config(_))
        ));
    }

    #[test]
    fn test_endpoints() {
        let embedder =
            OpenAiEmbedder::new(OpenAiEmbedderConfig::openai("k").with_base_url("http://h/v1/"))
                .unwrap();
        assert_eq!(embedder.endpoint(), "http://h/v1/embeddings");

        let embedder =
            OpenAiEmbedder::new(OpenAiEmbedderConfig::azure("https://res.azure.com", "ada", "k"))
                .unwrap();
        assert_eq!(
            embedder.endpoint(),
            "https://res.azure.com/openai/deployments/ada/embeddings?api-version=2023-05-15"
        );
        assert_eq!(embedder.info().name, "ada");
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let result = OpenAiEmbedder::new(OpenAiEmbedderConfig::openai("k").with_dimension(0));
        assert!(matches!(result, Err(EmbeddingError::Config(_))));
    }

    #[test]
    fn test_missing_key_returns_zero_vector() {
        let config = test_config("http://127.0.0.1:9").without_api_key();
        let embedder = OpenAiEmbedder::new(config).unwrap();
        let emb = embedder.embed("hello").unwrap();
        assert_eq!(emb, Embedding::zeros(3));
    }

    #[test]
    fn test_unreachable_service_returns_zero_vector() {
        // Nothing listens on the discard port
        let config = test_config("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
        let embedder = OpenAiEmbedder::new(config).unwrap();
        let embs = embedder.embed_batch(&["a", "b"]).unwrap();
        assert_eq!(embs.len(), 2);
        assert!(embs.iter().all(|e| e.dimension() == 3 && e.is_zero()));
    }

    #[tokio::test]
    async fn test_embed_success_normalizes_newlines() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "input": ["hello world"],
                "model": "text-embedding-ada-002"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}],
                "model": "text-embedding-ada-002"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let embs = embed_blocking(test_config(&server.uri()), vec!["hello\nworld"])
            .await
            .unwrap();
        assert_eq!(embs, vec![Embedding::new(vec![0.1, 0.2, 0.3])]);
    }

    #[tokio::test]
    async fn test_batch_ordered_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0, 0.0]},
                    {"index": 0, "embedding": [1.0, 0.0, 0.0]}
                ]
            })))
            .mount(&server)
            .await;

        let embs = embed_blocking(test_config(&server.uri()), vec!["first", "second"])
            .await
            .unwrap();
        assert_eq!(embs[0].values, vec![1.0, 0.0, 0.0]);
        assert_eq!(embs[1].values, vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_unauthorized_returns_zero_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided"}
            })))
            .mount(&server)
            .await;

        let embs = embed_blocking(test_config(&server.uri()), vec!["text"])
            .await
            .unwrap();
        assert_eq!(embs, vec![Embedding::zeros(3)]);
    }

    #[tokio::test]
    async fn test_server_error_returns_zero_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let embs = embed_blocking(test_config(&server.uri()), vec!["text"])
            .await
            .unwrap();
        assert!(embs[0].is_zero());
    }

    #[tokio::test]
    async fn test_bad_request_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("input too long"))
            .mount(&server)
            .await;

        let result = embed_blocking(test_config(&server.uri()), vec!["text"]).await;
        match result {
            Err(EmbeddingError::Api { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "input too long");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_response_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let result = embed_blocking(test_config(&server.uri()), vec!["text"]).await;
        assert!(matches!(result, Err(EmbeddingError::Parse(_))));
    }

    #[tokio::test]
    async fn test_azure_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/ada/embeddings"))
            .and(query_param("api-version", "2023-05-15"))
            .and(header("api-key", "azure-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "embedding": [0.5, 0.5, 0.5]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = OpenAiEmbedderConfig::azure(server.uri(), "ada", "azure-key")
            .with_dimension(3)
            .with_timeout(Duration::from_secs(5));
        let embs = embed_blocking(config, vec!["text"]).await.unwrap();
        assert_eq!(embs[0].values, vec![0.5, 0.5, 0.5]);
    }
}
