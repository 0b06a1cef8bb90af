use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::AppQuery;
use crate::matching::handlers::{match_stored, MatchQuery};
use crate::models::{Listing, ResumeProfile};
use crate::resume::ResumeExtraction;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct UploadResumeResponse {
    pub profile: ResumeProfile,
    pub extraction: ResumeExtraction,
    pub count: usize,
    pub results: Vec<Listing>,
}

/// POST /upload-pdf
pub async fn handle_upload_pdf(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<MatchQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResumeResponse>, AppError> {
    let document = read_file_field(multipart?).await?;
    info!("Received résumé upload ({} bytes)", document.len());

    let extraction = state.extractor.extract(document).await;
    let profile = extraction.profile();
    if profile.is_empty() {
        warn!("Résumé yielded an empty profile; nothing will match");
    }
    let results = match_stored(&state, &profile, params.mode).await?;

    Ok(Json(UploadResumeResponse {
        profile,
        extraction,
        count: results.len(),
        results,
    }))
}

async fn read_file_field(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.body_text()));
        }
    }
    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}
