use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ArtworkId);

/// Pipeline column an artwork sits in. The wire form is the lowercase key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Concept,
    #[serde(alias = "in-progress", alias = "in_progress")]
    Wip,
    Finished,
    Sold,
}

impl PipelineStatus {
    /// Board order, left to right.
    pub const ALL: [PipelineStatus; 4] = [
        PipelineStatus::Concept,
        PipelineStatus::Wip,
        PipelineStatus::Finished,
        PipelineStatus::Sold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStatus::Concept => "concept",
            PipelineStatus::Wip => "wip",
            PipelineStatus::Finished => "finished",
            PipelineStatus::Sold => "sold",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PipelineStatus::Concept => "Concept",
            PipelineStatus::Wip => "In Progress",
            PipelineStatus::Finished => "Finished",
            PipelineStatus::Sold => "Sold",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PipelineStatus::Concept => "#94a3b8",
            PipelineStatus::Wip => "#f59e0b",
            PipelineStatus::Finished => "#3b82f6",
            PipelineStatus::Sold => "#22c55e",
        }
    }

    pub fn index(self) -> usize {
        match self {
            PipelineStatus::Concept => 0,
            PipelineStatus::Wip => 1,
            PipelineStatus::Finished => 2,
            PipelineStatus::Sold => 3,
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pipeline status '{0}'; expected concept, wip, finished or sold")]
pub struct UnknownStatus(pub String);

impl FromStr for PipelineStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "concept" => Ok(PipelineStatus::Concept),
            "wip" | "in-progress" | "in_progress" => Ok(PipelineStatus::Wip),
            "finished" => Ok(PipelineStatus::Finished),
            "sold" => Ok(PipelineStatus::Sold),
            _ => Err(UnknownStatus(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub user_id: UserId,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Remote artwork row as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkRecord {
    pub id: ArtworkId,
    pub user_id: UserId,
    pub title: String,
    pub medium: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: PipelineStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
