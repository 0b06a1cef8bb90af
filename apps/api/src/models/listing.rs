use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Board name used when a source gives no usable grouping name.
pub const UNKNOWN_BOARD: &str = "unknown";

fn unknown_board() -> String {
    UNKNOWN_BOARD.to_string()
}

/// A normalized record as produced by a source adapter or an upload,
/// before it has been given an identity by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ListingDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "unknown_board")]
    pub board: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Canonical `YYYY-MM-DD HH:MM:SS`, see `normalize::date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    #[serde(default)]
    pub certificates: Vec<String>,
}

impl ListingDraft {
    pub fn new(board: impl Into<String>) -> Self {
        Self {
            board: board.into(),
            ..Self::default()
        }
    }

    /// Adapters only emit drafts that carry a non-blank title.
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// A persisted listing. The id comes from the store's counter and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub draft: ListingDraft,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Builds a listing from a draft, stamping both write timestamps.
    pub fn stamp(id: i64, draft: ListingDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            draft,
            created_at: now,
            updated_at: now,
        }
    }
}
