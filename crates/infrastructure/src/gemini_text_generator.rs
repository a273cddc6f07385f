//! Gemini `generateContent` adapter for the text generation port.

use std::time::Duration;

use async_trait::async_trait;
use hookforge_application::TextGenerator;
use hookforge_core::{AppError, AppResult};
use hookforge_domain::SamplingTemperature;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default public Gemini API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model used for hook generation.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Model identifier, for example `gemini-2.5-flash`.
    pub model: String,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Total attempts for transient failures.
    pub max_attempts: u8,
    /// Linear backoff step between attempts.
    pub retry_backoff_ms: u64,
}

/// HTTP-based Gemini implementation of [`TextGenerator`].
pub struct GeminiTextGenerator {
    http_client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiTextGenerator {
    /// Creates a generator from a shared HTTP client.
    #[must_use]
    pub fn new(http_client: reqwest::Client, mut config: GeminiConfig) -> Self {
        config.max_attempts = config.max_attempts.max(1);
        config.retry_backoff_ms = config.retry_backoff_ms.max(50);
        config.base_url = config.base_url.trim_end_matches('/').to_owned();

        Self {
            http_client,
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn generate(
        &self,
        prompt: &str,
        temperature: SamplingTemperature,
    ) -> AppResult<String> {
        let endpoint = self.endpoint();
        let body = GenerateContentRequest::new(prompt, temperature);

        let mut attempt = 0_u8;
        let mut last_error: Option<String> = None;

        while attempt < self.config.max_attempts {
            attempt = attempt.saturating_add(1);
            let response = self
                .http_client
                .post(endpoint.as_str())
                .header("x-goog-api-key", self.config.api_key.as_str())
                .json(&body)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let payload = response
                        .json::<GenerateContentResponse>()
                        .await
                        .map_err(|error| {
                            AppError::Upstream(format!("invalid gemini response body: {error}"))
                        })?;
                    return payload.into_text();
                }
                Ok(response)
                    if response.status().is_server_error()
                        || response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS =>
                {
                    last_error = Some(format!(
                        "transient gemini status {}",
                        response.status()
                    ));
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
                    return Err(AppError::Upstream(format!(
                        "gemini request failed with status {status}: {body}"
                    )));
                }
                Err(error) => {
                    last_error = Some(format!("gemini transport error: {error}"));
                }
            }

            if attempt < self.config.max_attempts {
                warn!(attempt, error = ?last_error, "retrying gemini request");
                let delay = self.config.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(AppError::Upstream(last_error.unwrap_or_else(|| {
            "gemini request exhausted retries".to_owned()
        })))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(prompt: &str, temperature: SamplingTemperature) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_owned()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: temperature.value(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn into_text(self) -> AppResult<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::Upstream(
                "gemini response contained no text".to_owned(),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hookforge_application::TextGenerator;
    use hookforge_core::AppError;
    use hookforge_domain::SamplingTemperature;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::{
        DEFAULT_GEMINI_MODEL, GeminiConfig, GeminiTextGenerator, GenerateContentRequest,
        GenerateContentResponse,
    };

    /// Serves one canned HTTP response per connection and counts requests.
    async fn spawn_stub_server(status: u16, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|_| unreachable!());
        let address = listener.local_addr().unwrap_or_else(|_| unreachable!());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                read_request(&mut socket).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{address}"), hits)
    }

    async fn read_request(socket: &mut TcpStream) {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 1024];

        loop {
            let read = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(read) => read,
            };
            buffer.extend_from_slice(&chunk[..read]);

            let Some(header_end) = buffer.windows(4).position(|window| window == b"\r\n\r\n")
            else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }

    fn generator_for(base_url: String, max_attempts: u8) -> GeminiTextGenerator {
        let http_client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|_| unreachable!());
        GeminiTextGenerator::new(
            http_client,
            GeminiConfig {
                api_key: "key".to_owned(),
                model: DEFAULT_GEMINI_MODEL.to_owned(),
                base_url,
                max_attempts,
                retry_backoff_ms: 0,
            },
        )
    }

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn request_body_matches_api_shape() {
        let body = GenerateContentRequest::new("say hi", SamplingTemperature::default());
        let value = serde_json::to_value(&body).unwrap_or_default();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "say hi");
        assert!(value["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let response = parse(json!({
            "candidates": [
                {"content": {"parts": [{"text": "Hook one\n"}, {"text": "Hook two"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }));

        assert_eq!(
            response.into_text().unwrap_or_default(),
            "Hook one\nHook two"
        );
    }

    #[test]
    fn response_without_text_is_upstream_error() {
        let response = parse(json!({"candidates": []}));
        assert!(matches!(response.into_text(), Err(AppError::Upstream(_))));

        let blocked = parse(json!({"candidates": [{"finishReason": "SAFETY"}]}));
        assert!(matches!(blocked.into_text(), Err(AppError::Upstream(_))));
    }

    #[test]
    fn endpoint_uses_model_and_trims_base_url() {
        let generator = GeminiTextGenerator::new(
            reqwest::Client::new(),
            GeminiConfig {
                api_key: "key".to_owned(),
                model: DEFAULT_GEMINI_MODEL.to_owned(),
                base_url: "https://example.test/".to_owned(),
                max_attempts: 0,
                retry_backoff_ms: 0,
            },
        );

        assert_eq!(
            generator.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(generator.config.max_attempts, 1);
    }

    #[tokio::test]
    async fn transient_statuses_are_retried_until_attempts_run_out() {
        for status in [503, 429] {
            let (base_url, hits) = spawn_stub_server(status, r#"{"error":"busy"}"#).await;
            let generator = generator_for(base_url, 3);

            let result = generator
                .generate("prompt", SamplingTemperature::default())
                .await;

            assert!(matches!(result, Err(AppError::Upstream(_))));
            assert_eq!(hits.load(Ordering::SeqCst), 3, "status {status}");
        }
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (base_url, hits) = spawn_stub_server(400, r#"{"error":"bad request"}"#).await;
        let generator = generator_for(base_url, 3);

        let result = generator
            .generate("prompt", SamplingTemperature::default())
            .await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_response_returns_joined_text() {
        let (base_url, hits) = spawn_stub_server(
            200,
            r#"{"candidates":[{"content":{"parts":[{"text":"Hook one\n"},{"text":"Hook two"}]}}]}"#,
        )
        .await;
        let generator = generator_for(base_url, 3);

        let result = generator
            .generate("prompt", SamplingTemperature::default())
            .await;

        assert_eq!(result.unwrap_or_default(), "Hook one\nHook two");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
