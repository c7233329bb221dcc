
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::EmbeddingConfig;
use crate::embeddings::Embedder;
use crate::{RagError, Result};

const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Client for a Hugging Face Inference feature-extraction endpoint.
///
/// Speaks the `POST /models/{model}/pipeline/feature-extraction` API with an
/// optional bearer token. Transport failures and server errors are retried
/// with exponential backoff; auth rejections and other client errors are not.
#[derive(Debug, Clone)]
pub struct HfEmbeddingClient {
    pipeline_url: Url,
    model: String,
    api_token: Option<String>,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

impl HfEmbeddingClient {
    #[inline]
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let pipeline_url = config
            .pipeline_url()
            .map_err(|e| RagError::EmbeddingUnavailable(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .build()
            .into();

        Ok(Self {
            pipeline_url,
            model: config.model.clone(),
            api_token: config.resolved_api_token(),
            agent,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    fn request_embedding(&self, text: &str) -> Result<String> {
        let body = serde_json::to_string(&FeatureExtractionRequest { inputs: text })
            .map_err(|e| RagError::EmbeddingUnavailable(e.to_string()))?;

        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("Embedding request attempt {}/{}", attempt, self.retry_attempts);

            let mut request = self
                .agent
                .post(self.pipeline_url.as_str())
                .header("Content-Type", "application/json");
            if let Some(token) = &self.api_token {
                request = request.header("Authorization", &format!("Bearer {token}"));
            }

            match request
                .send(&body)
                .and_then(|mut resp| resp.body_mut().read_to_string())
            {
                Ok(response_text) => return Ok(response_text),
                Err(error) => {
                    let should_retry = match &error {
                        ureq::Error::StatusCode(status) if *status == 401 || *status == 403 => {
                            return Err(RagError::EmbeddingAuth(format!("HTTP {status}")));
                        }
                        ureq::Error::StatusCode(status) => {
                            if *status >= 500 {
                                warn!(
                                    "Embedding server error (status {}), attempt {}/{}",
                                    status, attempt, self.retry_attempts
                                );
                                true
                            } else {
                                return Err(RagError::EmbeddingUnavailable(format!(
                                    "Client error: HTTP {status}"
                                )));
                            }
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Embedding transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                            true
                        }
                        _ => false,
                    };

                    if !should_retry {
                        return Err(RagError::EmbeddingUnavailable(error.to_string()));
                    }

                    last_error = Some(RagError::EmbeddingUnavailable(error.to_string()));

                    if attempt < self.retry_attempts {
                        let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000;
                        std::thread::sleep(Duration::from_millis(delay_ms));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            RagError::EmbeddingUnavailable("Request failed after retries".to_string())
        }))
    }
}

impl Embedder for HfEmbeddingClient {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response_text = self.request_embedding(text)?;
        let vector = parse_embedding_response(&response_text)?;

        debug!("Generated embedding with {} dimensions", vector.len());
        Ok(vector)
    }

    #[inline]
    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Parse the feature-extraction response body.
///
/// Sentence-transformer pipelines answer `[f32; D]` for a single input, but
/// some deployments wrap it as `[[f32; D]]`; accept both.
fn parse_embedding_response(body: &str) -> Result<Vec<f32>> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RagError::EmbeddingUnavailable(format!("Malformed response: {e}")))?;

    let array = value
        .as_array()
        .ok_or_else(|| RagError::EmbeddingUnavailable("Response is not an array".to_string()))?;

    let flat: &Vec<serde_json::Value> = match array.first() {
        Some(serde_json::Value::Array(inner)) => inner,
        _ => array,
    };

    let mut vector = Vec::with_capacity(flat.len());
    for value in flat {
        let number = value.as_f64().ok_or_else(|| {
            RagError::EmbeddingUnavailable("Response contains a non-numeric element".to_string())
        })?;
        vector.push(number as f32);
    }

    if vector.is_empty() {
        return Err(RagError::EmbeddingUnavailable(
            "Response contains no embedding values".to_string(),
        ));
    }

    Ok(vector)
}
