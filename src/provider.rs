//! 外部文本生成服务

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ProviderConfig;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// 429
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// 5xx或网络不可达
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// 根据提示词返回一段生成的文本，只尝试一次
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

pub struct HuggingFaceProvider {
    api_key: String,
    endpoint: String,
    timeout_secs: u64,
    max_new_tokens: u32,
    temperature: f64,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f64,
    return_full_text: bool,
    do_sample: bool,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
    use_cache: bool,
}

impl HuggingFaceProvider {
    pub fn new(
        api_key: String,
        endpoint: String,
        timeout_secs: u64,
        max_new_tokens: u32,
        temperature: f64,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        Ok(Self {
            api_key,
            endpoint,
            timeout_secs,
            max_new_tokens,
            temperature,
            client,
        })
    }

    /// 未启用或环境变量中没有密钥时返回None，此时只使用模板出题
    pub fn from_config(config: &ProviderConfig) -> Option<Self> {
        if !config.enabled {
            log::info!("外部出题服务未启用，使用模板出题");
            return None;
        }
        let Some(api_key) = config.api_key() else {
            log::info!("环境变量{}中没有API密钥，使用模板出题", config.api_key_env);
            return None;
        };
        match Self::new(
            api_key,
            config.endpoint.clone(),
            config.timeout_secs,
            config.max_new_tokens,
            config.temperature,
        ) {
            Ok(provider) => Some(provider),
            Err(e) => {
                log::error!("创建外部出题服务客户端失败: {e}");
                None
            }
        }
    }
}

// 返回值可能是[{generated_text}]也可能是{generated_text}
fn extract_generated_text(value: &Value) -> Option<String> {
    let entry = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    entry
        .get("generated_text")?
        .as_str()
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl QuestionProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
                return_full_text: false,
                do_sample: true,
            },
            options: InferenceOptions {
                wait_for_model: true,
                use_cache: false,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(match status {
                429 => ProviderError::QuotaExceeded(message),
                401 | 403 => ProviderError::AuthenticationFailed(message),
                500..=599 => ProviderError::Unavailable(format!("HTTP {status}: {message}")),
                _ => ProviderError::Api { status, message },
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        extract_generated_text(&value)
            .ok_or_else(|| ProviderError::InvalidResponse("missing generated_text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> HuggingFaceProvider {
        HuggingFaceProvider::new(
            "test-key".into(),
            format!("{}/models/quiz", server.uri()),
            5,
            500,
            0.7,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn returns_text_from_array_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/quiz"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "inputs": "make questions",
                "options": {"wait_for_model": true}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"generated_text": "[{\"type\":\"long\"}]"}
            ])))
            .mount(&server)
            .await;

        let text = provider(&server).generate("make questions").await.unwrap();
        assert_eq!(text, "[{\"type\":\"long\"}]");
    }

    #[tokio::test]
    async fn returns_text_from_object_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generated_text": "hello"})))
            .mount(&server)
            .await;

        assert_eq!(provider(&server).generate("p").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn classifies_error_statuses() {
        for status in [429u16, 401, 503, 422] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&server)
                .await;
            let err = provider(&server).generate("p").await.unwrap_err();
            let classified = match status {
                429 => matches!(err, ProviderError::QuotaExceeded(_)),
                401 => matches!(err, ProviderError::AuthenticationFailed(_)),
                503 => matches!(err, ProviderError::Unavailable(_)),
                _ => matches!(err, ProviderError::Api { status: 422, .. }),
            };
            assert!(classified, "status {status} gave {err}");
        }
    }

    #[tokio::test]
    async fn reply_without_text_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"score": 1}])))
            .mount(&server)
            .await;

        let err = provider(&server).generate("p").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn disabled_config_yields_no_provider() {
        let config = ProviderConfig {
            enabled: false,
            ..ProviderConfig::default()
        };
        assert!(HuggingFaceProvider::from_config(&config).is_none());
    }
}
