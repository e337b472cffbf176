//! Hugging Face text-generation client
//!
//! Speaks the text-generation-inference / Inference API protocol:
//! `{inputs, parameters}` in, `[{generated_text}]` (or a single object) out.
//! `return_full_text` is requested, so the prompt comes back in front of
//! the continuation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{GenerationParams, TextGenerator, HEALTH_TIMEOUT};
use crate::error::GenerationError;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    temperature: f32,
    do_sample: bool,
    return_full_text: bool,
}

/// Client for a text-generation-inference compatible endpoint
#[derive(Clone)]
pub struct HfTextGenerationClient {
    client: Client,
    endpoint: String,
}

impl HfTextGenerationClient {
    /// `endpoint` is the URL generation requests are POSTed to
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for HfTextGenerationClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                do_sample: true,
                return_full_text: true,
            },
        };

        let response = self.client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Unavailable(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body).map_err(|e| {
            GenerationError::InvalidResponse(format!(
                "{} (body: {})",
                e,
                body.chars().take(300).collect::<String>()
            ))
        })?;

        first_generated_text(&value)
    }

    /// Probes `GET /health`. Plain Inference API servers have no such route,
    /// so a 404 still means the server is up.
    async fn health(&self) -> Result<(), GenerationError> {
        let response = self.client
            .get(format!("{}/health", self.endpoint))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::NOT_FOUND {
            debug!("{} has no /health route; treating it as reachable", self.endpoint);
            Ok(())
        } else {
            Err(GenerationError::Unavailable(format!("health check returned {}", status)))
        }
    }

    fn name(&self) -> &'static str {
        "hf"
    }
}

/// Extract the first candidate's `generated_text`
fn first_generated_text(value: &Value) -> Result<String, GenerationError> {
    let candidate = match value {
        Value::Array(candidates) => candidates.first().ok_or(GenerationError::Empty)?,
        Value::Object(_) => value,
        _ => {
            return Err(GenerationError::InvalidResponse(
                "expected an array of candidates or a single candidate".to_string(),
            ))
        }
    };

    candidate
        .get("generated_text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GenerationError::InvalidResponse("candidate has no generated_text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::{get, post}, Json, Router};
    use serde_json::json;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(endpoint: &str) -> HfTextGenerationClient {
        HfTextGenerationClient::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_first_generated_text_shapes() {
        let array = json!([{"generated_text": "one"}, {"generated_text": "two"}]);
        assert_eq!(first_generated_text(&array).unwrap(), "one");

        let object = json!({"generated_text": "single"});
        assert_eq!(first_generated_text(&object).unwrap(), "single");

        assert!(matches!(first_generated_text(&json!([])), Err(GenerationError::Empty)));
        assert!(matches!(
            first_generated_text(&json!([{"text": "wrong"}])),
            Err(GenerationError::InvalidResponse(_))
        ));
        assert!(matches!(
            first_generated_text(&json!("plain")),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_request_carries_prompt_and_parameters() {
        let app = Router::new().route(
            "/",
            post(|Json(body): Json<Value>| async move {
                let params = &body["parameters"];
                Json(json!([{
                    "generated_text": format!(
                        "{}|{}|{}|{}",
                        body["inputs"].as_str().unwrap_or_default(),
                        params["max_new_tokens"],
                        params["return_full_text"],
                        params["do_sample"],
                    )
                }]))
            }),
        );
        let base = spawn(app).await;

        let params = GenerationParams { max_new_tokens: 250, temperature: 0.6 };
        let text = client(&base).generate("hello", &params).await.unwrap();
        assert_eq!(text, "hello|250|true|true");
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let app = Router::new().route(
            "/",
            post(|| async {
                (axum::http::StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "Model is loading"})))
            }),
        );
        let base = spawn(app).await;

        let err = client(&base).generate("hi", &GenerationParams::default()).await.unwrap_err();
        match err {
            GenerationError::Unavailable(msg) => assert!(msg.contains("Model is loading")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty() {
        let app = Router::new().route("/", post(|| async { Json(json!([])) }));
        let base = spawn(app).await;

        let err = client(&base).generate("hi", &GenerationParams::default()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Empty));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr))
            .generate("hi", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let app = Router::new().route(
            "/",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!([{"generated_text": "late"}]))
            }),
        );
        let base = spawn(app).await;

        let slow = HfTextGenerationClient::new(&base, Duration::from_millis(200)).unwrap();
        let err = slow.generate("hi", &GenerationParams::default()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_health() {
        let app = Router::new().route("/health", get(|| async { "ok" }));
        let base = spawn(app).await;
        assert!(client(&base).health().await.is_ok());
    }

    #[tokio::test]
    async fn test_health_without_route_counts_as_reachable() {
        let app = Router::new().route("/", post(|| async { Json(json!([{"generated_text": "x"}])) }));
        let base = spawn(app).await;
        assert!(client(&base).health().await.is_ok());
    }

    #[tokio::test]
    async fn test_health_server_error_is_unavailable() {
        let app = Router::new().route(
            "/health",
            get(|| async { axum::http::StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = spawn(app).await;
        assert!(matches!(client(&base).health().await, Err(GenerationError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_health_unreachable_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        // Generation timeout is long; the probe still fails fast
        let slow = HfTextGenerationClient::new(&format!("http://{}", addr), Duration::from_secs(120)).unwrap();
        let started = std::time::Instant::now();
        assert!(slow.health().await.is_err());
        assert!(started.elapsed() <= HEALTH_TIMEOUT + Duration::from_secs(1));
    }
}
