//! AI Analysis Client.
//!
//! Sends one task title to a Gemini model configured for structured JSON
//! output and turns the reply into an [`AnalysisResult`]. The reply is parsed
//! defensively regardless of the provider's own schema enforcement.

use crate::config::AnalyzerConfig;
use crate::error::{Result, TodoError};
use crate::models::AnalysisResult;
use crate::priority::Priority;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;

/// Produces an [`AnalysisResult`] for a non-blank task title.
pub trait TaskAnalyzer: Send + Sync {
    fn analyze(&self, title: &str) -> impl Future<Output = Result<AnalysisResult>> + Send;
}

pub fn build_prompt(title: &str) -> String {
    format!(
        "Analyze this todo task and suggest a priority level, a list of sub-tasks to complete it, and a brief reasoning: \"{}\"",
        title
    )
}

/// Schema sent as `responseSchema`; all three fields are required
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestedPriority": {
                "type": "STRING",
                "description": "Suggested priority: low, medium, or high"
            },
            "subTasks": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of 3-5 sub-tasks to achieve the main goal"
            },
            "reasoning": {
                "type": "STRING",
                "description": "A short sentence explaining the priority"
            }
        },
        "required": ["suggestedPriority", "subTasks", "reasoning"]
    })
}

/// Parse raw model text into an [`AnalysisResult`].
///
/// - empty text is read as `{}`
/// - a surrounding markdown code fence is ignored
/// - `suggestedPriority` outside {low, medium, high} becomes medium
/// - a missing or non-array `subTasks` becomes empty; non-string and blank items are dropped
/// - a missing or non-string `reasoning` becomes ""
///
/// Fails only when the text is not a JSON object.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult> {
    let text = strip_code_fence(raw.trim());
    let text = if text.is_empty() { "{}" } else { text };

    let value: Value = serde_json::from_str(text)?;
    let obj = value.as_object().ok_or_else(|| {
        TodoError::AnalysisFailed(format!("Expected a JSON object, got: {}", value))
    })?;

    let suggested_priority = Priority::coerce(obj.get("suggestedPriority").and_then(Value::as_str));

    let sub_tasks = obj
        .get("subTasks")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(AnalysisResult {
        suggested_priority,
        sub_tasks,
        reasoning,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini `generateContent` client.
///
/// Every failure (missing key, transport, non-2xx, empty candidates, bad JSON)
/// is absorbed by [`TaskAnalyzer::analyze`] into [`AnalysisResult::fallback`].
pub struct GeminiAnalyzer {
    config: AnalyzerConfig,
    client: reqwest::Client,
}

impl GeminiAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("smart-todo/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// One-shot generation; returns the model's raw text
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let response = self
            .client
            .post(self.config.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(TodoError::AnalysisFailed(format!(
                "Gemini API error (HTTP {}): {}",
                status, body
            )));
        }

        let body: GenerateResponse = response.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| TodoError::AnalysisFailed("Gemini returned no candidates".to_string()))?;

        Ok(text)
    }
}

impl TaskAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, title: &str) -> Result<AnalysisResult> {
        if !self.is_configured() {
            tracing::warn!("Gemini API key not configured, using default analysis");
            return Ok(AnalysisResult::fallback());
        }

        let raw = match self.generate(&build_prompt(title)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Task analysis request failed, using default analysis");
                return Ok(AnalysisResult::fallback());
            },
        };

        match parse_analysis(&raw) {
            Ok(result) => {
                tracing::debug!(
                    priority = %result.suggested_priority,
                    sub_tasks = result.sub_tasks.len(),
                    reasoning = %result.reasoning,
                    "Task analyzed"
                );
                Ok(result)
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse Gemini response, using default analysis");
                Ok(AnalysisResult::fallback())
            },
        }
    }
}
