use crate::priority::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A persisted row of the `todos` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sub_tasks: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// The insert payload for a new row. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTaskRecord {
    pub title: String,
    pub is_completed: bool,
    pub priority: Priority,
    pub sub_tasks: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl NewTaskRecord {
    /// Build the candidate row for `title` from an analysis result
    pub fn from_analysis(title: &str, analysis: &AnalysisResult, now: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            is_completed: false,
            priority: analysis.suggested_priority,
            sub_tasks: analysis.sub_tasks.clone(),
            created_at: now,
        }
    }
}

/// Structured output of the AI analysis step. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub suggested_priority: Priority,
    pub sub_tasks: Vec<String>,
    pub reasoning: String,
}

pub const ANALYSIS_FAILED_REASONING: &str = "Analysis failed.";

impl AnalysisResult {
    /// Result used whenever the model output cannot be used
    pub fn fallback() -> Self {
        Self {
            suggested_priority: Priority::Medium,
            sub_tasks: Vec::new(),
            reasoning: ANALYSIS_FAILED_REASONING.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.reasoning == ANALYSIS_FAILED_REASONING
            && self.sub_tasks.is_empty()
            && self.suggested_priority == Priority::Medium
    }
}

/// Counters derived from the current list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(Priority::coerce(raw.as_deref()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}
