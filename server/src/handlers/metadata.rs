use axum::extract::{RawQuery, State};
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::models::{MetadataQuery, MetadataResult};
use crate::state::AppState;

/// GET /api/metadata?url=<url>
///
/// Returns 400 only when `url` is missing or empty. Unreachable or broken
/// pages still answer 200 with a URL-only preview.
pub async fn get_metadata(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<MetadataResult>> {
    let url = MetadataQuery::parse(query.as_deref())
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::Validation("Missing URL parameter".into()))?;

    tracing::debug!(url = %url, "Extracting link metadata");

    Ok(Json(state.extractor.extract(&url).await))
}
