use serde_json::Value;

use crate::config::TeamContext;
use crate::domain::scores::{NormalizedResponse, normalize_response};
use crate::error::{AppError, AppResult};

pub const SYSTEM_PROMPT: &str = "You are an expert software development project manager who excels at analyzing and structuring development tickets. Your responses must always be valid JSON.";

pub fn ticket_prompt(request: &str, team: &TeamContext) -> String {
    format!(
        r#"You are Terry, a witty AI Product Manager. Create a ticket in JSON format with these fields:

{{
    "title": "Technical title summarizing the task",
    "description": "Full ticket description with your usual wit and style",
    "priority": "P0/P1/P2/P3",
    "impact_area": "Core Product/User Experience/Technical Debt/Infrastructure",
    "scores": {{
        "revenue_potential": 0-100,
        "user_impact": 0-100,
        "technical_complexity": 0-100,
        "strategic_alignment": 0-100
    }}
}}

Team context:
- Current sprint focus: {sprint}
- Quarter objectives: {objectives}

User request: {request}

Respond with valid JSON only.
"#,
        sprint = team.current_sprint_focus,
        objectives = team.quarter_objectives,
    )
}

/// Pulls the outermost JSON object out of free-form model output and strips
/// trailing commas before closing braces.
pub fn extract_json_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let cleaned = text[start..=end].replace(",\n}", "}").replace(",}", "}");
    Some(cleaned)
}

pub fn parse_ticket_json(content: &str) -> AppResult<NormalizedResponse> {
    let value: Value = serde_json::from_str(content).map_err(|err| {
        AppError::LanguageModel(format!("model did not return valid JSON: {err}"))
    })?;
    Ok(normalize_response(&value))
}
