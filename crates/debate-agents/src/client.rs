//! OpenAI-compatible chat completions client.

use async_trait::async_trait;
use debate_coordination::{GenerationError, Generator, Prompt};
use tracing::debug;

use crate::config::Endpoint;

/// Upper bound on completion length per call.
const MAX_TOKENS: u32 = 1024;

/// Generator backed by a `/chat/completions` endpoint.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: Endpoint,
}

impl OpenAiGenerator {
    pub fn new(endpoint: Endpoint) -> Result<Self, GenerationError> {
        // Leave headroom above the per-call deadline so TimeoutGenerator fires first.
        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout * 2)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    fn url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.endpoint.base_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, prompt: &Prompt) -> serde_json::Value {
        serde_json::json!({
            "model": self.endpoint.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": self.endpoint.temperature
        })
    }
}

/// Pull the first choice's message text out of a completion response.
pub(crate) fn extract_content(resp_json: &serde_json::Value) -> Result<String, GenerationError> {
    let content = resp_json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            GenerationError::Parse("response has no choices[0].message.content".to_string())
        })?;
    Ok(content.to_string())
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let mut request = self
            .client
            .post(self.url())
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt));
        if let Some(key) = &self.endpoint.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let resp_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        let content = extract_content(&resp_json)?;
        debug!(
            model = %self.endpoint.model,
            chars = content.len(),
            usage = %resp_json["usage"],
            "completion received"
        );
        Ok(content)
    }
}
