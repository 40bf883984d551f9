use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TeamContext;
use crate::domain::scores::NormalizedResponse;
use crate::error::{AppError, AppResult};
use crate::infra::prompt::{extract_json_object, parse_ticket_json, ticket_prompt};
use crate::services::LanguageModelService;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

const JSON_INSTRUCTION: &str = "\nProvide your response as a valid JSON object and nothing else:";

/// Client for a local llama.cpp server (`/completion` API).
pub struct LlamaClient {
    http: Client,
    endpoint: String,
    team: TeamContext,
}

impl LlamaClient {
    pub fn new(endpoint: Option<String>, team: TeamContext) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            endpoint: endpoint
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            team,
        })
    }

    fn completion_endpoint(&self) -> String {
        format!("{}/completion", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModelService for LlamaClient {
    async fn process(&self, request: &str) -> AppResult<NormalizedResponse> {
        let mut prompt = ticket_prompt(request, &self.team);
        prompt.push_str(JSON_INSTRUCTION);

        let body = CompletionRequest {
            prompt,
            n_predict: 1000,
            temperature: 0.7,
            stop: vec!["}"],
        };

        let response = self
            .http
            .post(self.completion_endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::LanguageModel(format!("failed to call Llama server: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::LanguageModel(format!(
                "Llama server responded with {status}: {body}"
            )));
        }

        let payload: CompletionResponse = response.json().await.map_err(|err| {
            AppError::LanguageModel(format!("failed to parse Llama response: {err}"))
        })?;
        debug!("Llama returned {} bytes", payload.content.len());

        parse_ticket_json(&repair_completion(&payload.content)?)
    }
}

/// Generation stops at the first `}`, so the closing brace usually needs to be
/// put back before the object can be parsed.
fn repair_completion(text: &str) -> AppResult<String> {
    let mut text = text.trim().to_string();
    if !text.ends_with('}') {
        text.push('}');
    }
    extract_json_object(&text).ok_or_else(|| {
        AppError::LanguageModel("no valid JSON object found in Llama response".to_string())
    })
}

#[derive(Serialize)]
struct CompletionRequest {
    prompt: String,
    n_predict: u32,
    temperature: f32,
    stop: Vec<&'static str>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_brace_removed_by_stop_sequence() {
        let repaired =
            repair_completion(" {\"title\": \"Cache warmup\", \"description\": \"x\"").unwrap();
        let parsed = parse_ticket_json(&repaired).unwrap();
        assert_eq!(parsed.title, "Cache warmup");
        assert_eq!(parsed.description, "x");
    }

    #[test]
    fn flat_reply_with_trailing_comma_parses() {
        let repaired =
            repair_completion("{\"title\": \"Audit log\", \"user_impact\": 80,").unwrap();
        let parsed = parse_ticket_json(&repaired).unwrap();
        assert_eq!(parsed.scores.user_impact, 80.0);
        assert_eq!(parsed.scores.revenue_potential, 50.0);
    }

    #[test]
    fn reply_without_object_is_error() {
        assert!(matches!(
            repair_completion("I cannot help with that"),
            Err(AppError::LanguageModel(_))
        ));
    }

    #[test]
    fn endpoint_defaults_to_local_server() {
        let client = LlamaClient::new(None, TeamContext::default()).unwrap();
        assert_eq!(client.completion_endpoint(), "http://127.0.0.1:8080/completion");
    }
}
