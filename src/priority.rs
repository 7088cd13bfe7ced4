use serde::{Deserialize, Serialize};

/// Priority levels a task can carry.
///
/// Stored as lowercase text (`low`, `medium`, `high`) in the `priority` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parse a priority suggested by the model. Unknown values become `Medium`.
    ///
    /// Matching is exact: the stored value set is lowercase-only, so `"High"`
    /// from the model is treated as invalid just like `"urgent"`.
    pub fn coerce(s: Option<&str>) -> Self {
        match s {
            Some("low") => Self::Low,
            Some("medium") => Self::Medium,
            Some("high") => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
