use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::{Listing, ListingDraft};
use crate::state::AppState;
use crate::store::{save, SaveOptions};

#[derive(Serialize)]
pub struct ListingsResponse {
    pub count: usize,
    pub items: Vec<Listing>,
}

impl From<Vec<Listing>> for ListingsResponse {
    fn from(items: Vec<Listing>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ScholarshipQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ScholarshipQuery {
    /// `category` is an exact board match, `search` a case-insensitive title substring.
    /// Blank parameters are ignored.
    pub fn accepts(&self, listing: &Listing) -> bool {
        let category = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
        if let Some(category) = category {
            if listing.draft.board != category {
                return false;
            }
        }

        let search = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match search {
            Some(search) => listing
                .draft
                .title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(&search.to_lowercase())),
            None => true,
        }
    }
}

#[derive(Serialize)]
pub struct UploadJsonResponse {
    pub status: &'static str,
    pub inserted: usize,
    pub ids: Vec<i64>,
}

/// GET /api/list
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<ListingsResponse>, AppError> {
    Ok(Json(state.store.scan().await?.into()))
}

/// GET /api/scholarships
pub async fn handle_scholarships(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ScholarshipQuery>,
) -> Result<Json<ListingsResponse>, AppError> {
    let items: Vec<Listing> = state
        .store
        .scan()
        .await?
        .into_iter()
        .filter(|listing| params.accepts(listing))
        .collect();
    Ok(Json(items.into()))
}

/// GET /api/scholarships/:id
pub async fn handle_get_scholarship(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Listing>, AppError> {
    let listing = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Listing {id} not found")))?;
    Ok(Json(listing))
}

/// POST /upload-json
pub async fn handle_upload_json(
    State(state): State<AppState>,
    AppJson(drafts): AppJson<Vec<ListingDraft>>,
) -> Result<Json<UploadJsonResponse>, AppError> {
    let report = save(
        state.store.as_ref(),
        drafts,
        SaveOptions::default(),
        Utc::now(),
    )
    .await?;
    Ok(Json(UploadJsonResponse {
        status: "ok",
        inserted: report.inserted,
        ids: report.ids,
    }))
}
