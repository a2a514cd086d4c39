//! HTTP client for the synthesis backend

use std::{sync::OnceLock, time::Duration};

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use voxgate_config::SynthesisConfig;

use crate::error::{Result, SynthesisError};

/// Common HTTP client to reuse connections across synthesis calls
fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| {
            let mut headers = http::HeaderMap::new();
            headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

            Client::builder()
                .pool_idle_timeout(Some(Duration::from_secs(5)))
                .tcp_nodelay(true)
                .tcp_keepalive(Some(Duration::from_secs(60)))
                .default_headers(headers)
                .build()
                .expect("Failed to build default HTTP client")
        })
        .clone()
}

#[derive(Debug, Serialize)]
struct TtsCallBody<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_preference: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bitrate: Option<u32>,
}

/// Successful synthesis backend response
#[derive(Debug, Clone, Deserialize)]
pub struct TtsResponse {
    pub audio_url: String,
    #[serde(default)]
    pub cached: bool,
    pub provider: String,
    pub expires_at: String,
}

#[derive(Deserialize)]
struct TtsErrorBody {
    error: String,
}

/// Client for the `POST {base_url}/tts` synthesis endpoint
pub struct SynthesisClient {
    endpoint: reqwest::Url,
    api_key: Option<SecretString>,
    timeout: Duration,
    retries: u32,
}

impl SynthesisClient {
    pub fn new(config: &SynthesisConfig) -> Result<Self> {
        let endpoint = format!("{}/tts", config.base_url.as_str().trim_end_matches('/'));
        let endpoint = reqwest::Url::parse(&endpoint)
            .map_err(|e| SynthesisError::Config(format!("invalid base_url: {e}")))?;

        let timeout = duration_str::parse(&config.timeout)
            .map_err(|e| SynthesisError::Config(format!("invalid timeout: {e}")))?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            timeout,
            retries: config.retries,
        })
    }

    /// Issue one synthesis call, retrying transient network failures
    ///
    /// Only connection errors and timeouts are retried; a rejection from
    /// the backend is final and belongs to the caller's fallback chain.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        provider: Option<&str>,
        bitrate: Option<u32>,
    ) -> Result<TtsResponse> {
        let mut last = SynthesisError::Timeout;

        for attempt in 0..=self.retries {
            match self.call_once(text, voice, provider, bitrate).await {
                Ok(response) => return Ok(response),
                Err(e @ (SynthesisError::Connection(_) | SynthesisError::Timeout)) => {
                    if attempt < self.retries {
                        tracing::debug!(attempt, error = %e, "synthesis call failed, retrying");
                    }
                    last = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last)
    }

    async fn call_once(
        &self,
        text: &str,
        voice: Option<&str>,
        provider: Option<&str>,
        bitrate: Option<u32>,
    ) -> Result<TtsResponse> {
        let body = TtsCallBody {
            text,
            voice,
            provider_preference: provider,
            bitrate,
        };

        let mut request = http_client()
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .json(&body);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SynthesisError::Timeout
            } else {
                SynthesisError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<TtsResponse>()
                .await
                .map_err(|e| SynthesisError::Connection(format!("invalid response body: {e}")))
        } else {
            let message = response
                .json::<TtsErrorBody>()
                .await
                .map_or_else(
                    |_| status.canonical_reason().unwrap_or("synthesis failed").to_owned(),
                    |body| body.error,
                );

            Err(SynthesisError::ProviderRejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_tts_path() {
        let config = SynthesisConfig::default();
        let client = SynthesisClient::new(&config).unwrap();
        assert_eq!(client.endpoint.as_str(), "http://127.0.0.1:9090/tts");
    }

    #[test]
    fn trailing_slash_does_not_double_up() {
        let config = SynthesisConfig {
            base_url: "http://tts.internal/".parse().unwrap(),
            ..SynthesisConfig::default()
        };
        let client = SynthesisClient::new(&config).unwrap();
        assert_eq!(client.endpoint.as_str(), "http://tts.internal/tts");
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let config = SynthesisConfig {
            timeout: "whenever".to_owned(),
            ..SynthesisConfig::default()
        };
        assert!(matches!(
            SynthesisClient::new(&config),
            Err(SynthesisError::Config(_))
        ));
    }

    #[test]
    fn call_body_omits_unset_fields() {
        let body = TtsCallBody {
            text: "Hello there",
            voice: None,
            provider_preference: Some("elevenlabs"),
            bitrate: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text"], "Hello there");
        assert_eq!(json["provider_preference"], "elevenlabs");
        assert!(json.get("voice").is_none());
        assert!(json.get("bitrate").is_none());
    }
}
