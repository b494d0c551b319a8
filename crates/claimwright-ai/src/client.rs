//! HTTP client for a local Ollama server.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{GenerationBackend, GenerationRequest, GenerationResult};
use crate::error::GenerationError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "mistral:latest";

/// Connection settings for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama API, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model to generate with, as listed by `ollama list`.
    pub model: String,
    /// Budget for the `/api/tags` liveness probe.
    pub health_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            health_timeout: Duration::from_secs(5),
        }
    }
}

/// Client for the Ollama REST API.
///
/// Construct once and share by reference; the underlying connection pool
/// is reused across calls.
pub struct OllamaClient {
    client: reqwest::Client,
    config: OllamaConfig,
}

// ── Wire types ──

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions<'a>,
}

#[derive(Serialize)]
struct GenerateOptions<'a> {
    temperature: f32,
    num_predict: u32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    eval_count: u64,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClient {
    /// Create a client for the given configuration.
    ///
    /// A trailing slash on `base_url` is dropped.
    pub fn new(mut config: OllamaConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        info!(base_url = %config.base_url, model = %config.model, "initialised Ollama client");
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Names of the models the server has pulled locally.
    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/api/tags", self.config.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(self.config.health_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.config.health_timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn transport_error(&self, err: reqwest::Error, timeout: Duration) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout {
                timeout_secs: timeout.as_secs_f64(),
            }
        } else {
            GenerationError::Unreachable {
                url: self.config.base_url.clone(),
                message: err.to_string(),
            }
        }
    }
}

/// Whether a model listed by the server satisfies the configured name.
///
/// An untagged name resolves to `:latest` only, so `mistral` matches
/// `mistral:latest` but not `mistral:7b`.
fn model_matches(listed: &str, configured: &str) -> bool {
    if listed == configured {
        return true;
    }
    !configured.contains(':') && listed == format!("{configured}:latest")
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn check_health(&self) -> bool {
        match self.list_models().await {
            Ok(models) => {
                if models.iter().any(|m| model_matches(m, &self.config.model)) {
                    debug!(model = %self.config.model, "Ollama health check passed");
                    true
                } else {
                    warn!(
                        model = %self.config.model,
                        available = ?models,
                        "configured model not found on Ollama server"
                    );
                    false
                }
            }
            Err(e) => {
                warn!(base_url = %self.config.base_url, error = %e, "Ollama health check failed");
                false
            }
        }
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let url = format!("{}/api/generate", self.config.base_url);
        let body = GenerateBody {
            model: &self.config.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
                stop: &request.stop,
            },
        };

        debug!(prompt_chars = request.prompt.len(), "sending generate request");
        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e, request.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp
            .text()
            .await
            .map_err(|e| self.transport_error(e, request.timeout))?;
        let parsed: GenerateResponse = serde_json::from_str(&raw)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            chars = parsed.response.len(),
            tokens = parsed.eval_count,
            elapsed_ms = elapsed_ms.round(),
            "generation complete"
        );

        Ok(GenerationResult {
            text: parsed.response,
            token_count: parsed.eval_count,
            elapsed_ms,
            model: self.config.model.clone(),
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use serde_json::{Value, json};

    /// Serve `app` on an ephemeral port and return its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// A base URL nothing is listening on.
    async fn dead_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn client_for(base_url: String, model: &str) -> OllamaClient {
        OllamaClient::new(OllamaConfig {
            base_url,
            model: model.into(),
            health_timeout: Duration::from_secs(2),
        })
    }

    fn tags_app() -> Router {
        Router::new().route(
            "/api/tags",
            get(|| async {
                Json(json!({
                    "models": [{"name": "mistral:latest"}, {"name": "llama3.2:3b"}]
                }))
            }),
        )
    }

    #[test]
    fn trims_trailing_slash() {
        let client = client_for("http://localhost:11434/".into(), DEFAULT_MODEL);
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn model_matching() {
        assert!(model_matches("mistral:latest", "mistral:latest"));
        assert!(model_matches("mistral:latest", "mistral"));
        assert!(!model_matches("mistral:7b", "mistral:latest"));
        assert!(!model_matches("mistral-nemo:latest", "mistral"));
        assert!(!model_matches("mistral:7b", "mistral"));
    }

    #[tokio::test]
    async fn health_false_when_only_other_tag_is_pulled() {
        let base = serve(tags_app()).await;
        assert!(!client_for(base, "llama3.2").check_health().await);
    }

    #[tokio::test]
    async fn health_true_when_model_listed() {
        let base = serve(tags_app()).await;
        assert!(client_for(base, "mistral:latest").check_health().await);
    }

    #[tokio::test]
    async fn health_false_when_model_missing() {
        let base = serve(tags_app()).await;
        assert!(!client_for(base, "phi3:mini").check_health().await);
    }

    #[tokio::test]
    async fn health_false_on_server_error() {
        let app = Router::new().route(
            "/api/tags",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(app).await;
        assert!(!client_for(base, DEFAULT_MODEL).check_health().await);
    }

    #[tokio::test]
    async fn health_false_when_unreachable() {
        let base = dead_url().await;
        assert!(!client_for(base, DEFAULT_MODEL).check_health().await);
    }

    #[tokio::test]
    async fn list_models_returns_names() {
        let base = serve(tags_app()).await;
        let models = client_for(base, DEFAULT_MODEL).list_models().await.unwrap();
        assert_eq!(models, vec!["mistral:latest", "llama3.2:3b"]);
    }

    #[tokio::test]
    async fn generate_sends_wire_body_and_reads_response() {
        // Echo the request body back as the generated text.
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"response": body.to_string(), "eval_count": 42}))
            }),
        );
        let base = serve(app).await;
        let client = client_for(base, "mistral:latest");

        let request = GenerationRequest::new("Describe the drone.")
            .with_system("You are a patent attorney.")
            .with_sampling(0.2, 512)
            .with_stop(vec!["## END".into()])
            .with_timeout(Duration::from_secs(5));
        let result = client.generate(&request).await.unwrap();

        assert_eq!(result.token_count, 42);
        assert_eq!(result.model, "mistral:latest");
        assert!(result.elapsed_ms >= 0.0);

        let sent: Value = serde_json::from_str(&result.text).unwrap();
        assert_eq!(sent["model"], "mistral:latest");
        assert_eq!(sent["prompt"], "Describe the drone.");
        assert_eq!(sent["system"], "You are a patent attorney.");
        assert_eq!(sent["stream"], false);
        assert_eq!(sent["options"]["num_predict"], 512);
        assert_eq!(sent["options"]["stop"][0], "## END");
        let temp = sent["options"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6);
    }

    #[tokio::test]
    async fn generate_omits_optional_fields() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"response": body.to_string()}))
            }),
        );
        let base = serve(app).await;
        let result = client_for(base, DEFAULT_MODEL)
            .generate(&GenerationRequest::new("hi"))
            .await
            .unwrap();

        let sent: Value = serde_json::from_str(&result.text).unwrap();
        assert!(sent.get("system").is_none());
        assert!(sent["options"].get("stop").is_none());
        assert_eq!(result.token_count, 0);
    }

    #[tokio::test]
    async fn generate_server_error_carries_status_and_body() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::NOT_FOUND, "model 'nope' not found, try pulling it first") }),
        );
        let base = serve(app).await;
        let err = client_for(base, "nope")
            .generate(&GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        match err {
            GenerationError::Server { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_times_out() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"response": "late"}))
            }),
        );
        let base = serve(app).await;
        let request = GenerationRequest::new("hi").with_timeout(Duration::from_millis(200));
        let err = client_for(base, DEFAULT_MODEL)
            .generate(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn generate_unreachable() {
        let base = dead_url().await;
        let err = client_for(base, DEFAULT_MODEL)
            .generate(&GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Unreachable { .. }), "got {err:?}");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn generate_invalid_body() {
        let app = Router::new().route("/api/generate", post(|| async { "not json" }));
        let base = serve(app).await;
        let err = client_for(base, DEFAULT_MODEL)
            .generate(&GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)), "got {err:?}");
        assert!(!err.is_transient());
    }
}
