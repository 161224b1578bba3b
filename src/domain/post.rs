//! The journal post entity and its display ordering

use crate::domain::data_url;
use crate::domain::dates::parse_sort_key;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Reverse;

/// A single journal entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_string"
    )]
    pub id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub created_at: String,

    /// Data-URL (not yet uploaded) or resolved URL
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_string"
    )]
    pub image: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_string"
    )]
    pub updated_at: Option<String>,
}

/// Older data stores `""` or `null` for "no value", and some ids as numbers.
fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl Post {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Post {
            title: title.into(),
            content: content.into(),
            created_at: created_at.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// The image is inline data that a remote backend still has to upload
    pub fn has_pending_image(&self) -> bool {
        self.image.as_deref().is_some_and(data_url::is_data_url)
    }

    pub fn id_matches(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

/// Order posts for presentation: most recent `createdAt` first, ties broken by
/// title. Posts whose date cannot be parsed go last, ordered by title.
pub fn sort_for_display(posts: &mut [Post]) {
    posts.sort_by_cached_key(|p| (Reverse(parse_sort_key(&p.created_at)), p.title.clone()));
}
