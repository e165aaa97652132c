use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{LlmError, LlmProvider, Message, Role};

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_request_body(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> serde_json::Value {
        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": m.content,
                })
            })
            .collect();

        json!({
            "model": self.model,
            "messages": api_messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        })
    }

    fn extract_text(resp: &serde_json::Value) -> Result<String, LlmError> {
        let choice = &resp["choices"][0];
        let content = choice["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing choices[0].message.content".into()))?;
        if content.trim().is_empty() {
            let reason = choice["finish_reason"].as_str().unwrap_or("unknown");
            return Err(LlmError::EmptyResponse(reason.to_string()));
        }
        Ok(content.to_string())
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&messages, temperature, max_tokens);

        debug!("OpenAI request to {} (model={})", url, self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        Self::extract_text(&resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_keeps_roles_inline() {
        let provider = OpenAiProvider::new("k".into(), "gpt-4o-mini".into(), "https://api.openai.com/".into());
        let body = provider.build_request_body(
            &[Message::system("Speak as Sam."), Message::user("Hi")],
            0.7,
            512,
        );
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hi");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(provider.base_url, "https://api.openai.com");
    }

    #[test]
    fn extract_reads_first_choice() {
        let resp = json!({ "choices": [{ "message": { "content": "I led the migration." } }] });
        assert_eq!(OpenAiProvider::extract_text(&resp).unwrap(), "I led the migration.");
    }

    #[test]
    fn extract_rejects_missing_content() {
        let resp = json!({ "choices": [] });
        assert!(matches!(OpenAiProvider::extract_text(&resp), Err(LlmError::ParseError(_))));
    }
}
