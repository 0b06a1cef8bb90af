use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::matching::{MatchMode, Matcher};
use crate::models::{Listing, ResumeProfile};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub mode: MatchMode,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub count: usize,
    pub mode: MatchMode,
    pub results: Vec<Listing>,
}

/// Filters every stored listing against `profile`.
pub(crate) async fn match_stored(
    state: &AppState,
    profile: &ResumeProfile,
    mode: MatchMode,
) -> Result<Vec<Listing>, AppError> {
    let listings = state.store.scan().await?;
    let results = Matcher::new(&state.majors).filter(profile, &listings, mode);
    info!(
        "Matched {}/{} listings (mode {mode:?}, major {:?})",
        results.len(),
        listings.len(),
        profile.major
    );
    Ok(results)
}

/// POST /api/filter-scholarships
pub async fn handle_filter_scholarships(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<MatchQuery>,
    AppJson(profile): AppJson<ResumeProfile>,
) -> Result<Json<MatchResponse>, AppError> {
    let results = match_stored(&state, &profile, params.mode).await?;
    Ok(Json(MatchResponse {
        count: results.len(),
        mode: params.mode,
        results,
    }))
}

/// POST /api/resumes
/// Older name of the same filter, kept for existing clients.
pub async fn handle_resumes(
    state: State<AppState>,
    params: AppQuery<MatchQuery>,
    profile: AppJson<ResumeProfile>,
) -> Result<Json<MatchResponse>, AppError> {
    handle_filter_scholarships(state, params, profile).await
}
