use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use astrolabe::interpretation::Prompt;
use astrolabe_config::OracleSettings;

use crate::oracle::{OracleError, TextOracle};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client for Groq.
pub struct GroqOracle {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl GroqOracle {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            timeout,
        })
    }

    pub fn from_settings(settings: &OracleSettings) -> anyhow::Result<Self> {
        let api_key = settings.api_key()?;
        Ok(Self::new(
            settings.base_url.as_str(),
            settings.model.as_str(),
            api_key,
            settings.timeout(),
        )?)
    }

    fn request<'a>(&'a self, prompt: &'a Prompt) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: prompt.params.temperature,
            max_tokens: prompt.params.max_tokens,
            top_p: prompt.params.top_p,
            response_format: prompt.params.json_mode.then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

#[async_trait]
impl TextOracle for GroqOracle {
    async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.base_url);
        log::debug!("Requesting {} reading from {}", prompt.template, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.timeout)
                } else {
                    OracleError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(OracleError::EmptyCompletion)
    }
}
