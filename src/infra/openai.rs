use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TeamContext;
use crate::domain::scores::NormalizedResponse;
use crate::error::{AppError, AppResult};
use crate::infra::prompt::{SYSTEM_PROMPT, parse_ticket_json, ticket_prompt};
use crate::services::LanguageModelService;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
    team: TeamContext,
}

impl OpenAiClient {
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        endpoint: Option<String>,
        team: TeamContext,
    ) -> AppResult<Self> {
        let api_key = api_key.filter(|key| !key.trim().is_empty()).ok_or_else(|| {
            AppError::Configuration(
                "OpenAI API key not found; use --openai-api-key or OPENAI_API_KEY".to_string(),
            )
        })?;
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            team,
        })
    }

    fn completions_endpoint(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModelService for OpenAiClient {
    async fn process(&self, request: &str) -> AppResult<NormalizedResponse> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: ticket_prompt(request, &self.team),
                },
            ],
            temperature: 0.7,
            max_tokens: 1000,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .http
            .post(self.completions_endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::LanguageModel(format!("failed to call OpenAI: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::LanguageModel(format!(
                "OpenAI responded with {status}: {body}"
            )));
        }

        let payload: ChatResponse = response.json().await.map_err(|err| {
            AppError::LanguageModel(format!("failed to parse OpenAI response: {err}"))
        })?;
        let content = payload.into_content()?;
        debug!("OpenAI returned {} bytes of ticket JSON", content.len());

        parse_ticket_json(&content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl ChatResponse {
    fn into_content(self) -> AppResult<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::LanguageModel("OpenAI returned no content".to_string()))
    }
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scores::ScoreSet;

    #[test]
    fn missing_api_key_is_configuration_error() {
        let result = OpenAiClient::new(Some("  ".to_string()), None, None, TeamContext::default());
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn endpoint_defaults_and_trims() {
        let client = OpenAiClient::new(
            Some("sk-test".to_string()),
            None,
            Some("http://localhost:9000/v1/".to_string()),
            TeamContext::default(),
        )
        .unwrap();
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(
            client.completions_endpoint(),
            "http://localhost:9000/v1/chat/completions"
        );
    }

    #[test]
    fn extracts_first_choice_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"title\":\"Search\",\"scores\":{\"user_impact\":90}}"}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        let parsed = parse_ticket_json(&response.into_content().unwrap()).unwrap();
        assert_eq!(parsed.title, "Search");
        assert_eq!(parsed.scores, ScoreSet::new(50.0, 90.0, 50.0, 50.0));
    }

    #[test]
    fn empty_choices_are_an_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            response.into_content(),
            Err(AppError::LanguageModel(_))
        ));
        assert!(parse_ticket_json("not json").is_err());
    }

    #[test]
    fn request_serializes_json_mode() {
        let body = ChatRequest {
            model: "gpt-test",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi".to_string(),
            }],
            temperature: 0.7,
            max_tokens: 1000,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["max_tokens"], 1000);
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
