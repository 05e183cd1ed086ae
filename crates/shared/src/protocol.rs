use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{ArtworkRecord, PipelineStatus, UserId};

/// Fields supplied when an artwork is created from a pipeline column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkFields {
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
}

impl ArtworkFields {
    pub fn new(
        title: impl Into<String>,
        medium: impl Into<String>,
        status: PipelineStatus,
    ) -> Self {
        Self {
            title: title.into(),
            medium: medium.into(),
            price: None,
            due_date: None,
            description: None,
            image_url: None,
            status,
        }
    }
}

/// Partial edit. An absent field is left untouched. For the optional
/// fields, an explicit `null` (`Some(None)`) clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtworkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub price: Option<Option<f64>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PipelineStatus>,
}

impl ArtworkPatch {
    pub fn is_empty(&self) -> bool {
        self == &ArtworkPatch::default()
    }
}

/// Keeps a present `null` apart from a missing key; `default` covers the latter.
fn present_or_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArtworkRequest {
    pub user_id: UserId,
    pub fields: ArtworkFields,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PipelineStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PipelineStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListArtworksQuery {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PipelineStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtworkList {
    pub data: Vec<ArtworkRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub display_name: String,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
