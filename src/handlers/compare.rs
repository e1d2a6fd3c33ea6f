//! Compare handler

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use uuid::Uuid;

use crate::models::{CompareResponse, FEED_FIELD, IMAGE_A_FIELD, IMAGE_B_FIELD};
use crate::security::validate_upload;
use crate::{AppError, AppResult, AppState};

#[derive(Default)]
struct CompareUploads {
    feed: Option<Bytes>,
    image_a: Option<Bytes>,
    image_b: Option<Bytes>,
}

fn required(slot: Option<Bytes>, field: &str) -> AppResult<Bytes> {
    slot.ok_or_else(|| AppError::ValidationError(format!("Missing required field: {}", field)))
}

/// Score two candidate images against a feed screenshot
pub async fn compare(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<CompareResponse>> {
    let analysis_id = Uuid::new_v4();
    let max_bytes = state.config.max_upload_bytes();
    let mut uploads = CompareUploads::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let slot = match name.as_str() {
            FEED_FIELD => &mut uploads.feed,
            IMAGE_A_FIELD => &mut uploads.image_a,
            IMAGE_B_FIELD => &mut uploads.image_b,
            other => {
                tracing::debug!(%analysis_id, field = other, "Ignoring unknown form field");
                continue;
            }
        };

        if slot.is_some() {
            return Err(AppError::ValidationError(format!("Duplicate field: {}", name)));
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        validate_upload(&name, filename.as_deref(), content_type.as_deref(), data.len(), max_bytes)?;
        *slot = Some(data);
    }

    let feed = required(uploads.feed, FEED_FIELD)?;
    let image_a = required(uploads.image_a, IMAGE_A_FIELD)?;
    let image_b = required(uploads.image_b, IMAGE_B_FIELD)?;

    tracing::info!(
        %analysis_id,
        feed_bytes = feed.len(),
        image_a_bytes = image_a.len(),
        image_b_bytes = image_b.len(),
        "Extracting color palettes..."
    );

    let analyzer = state.analyzer;
    let comparison = tokio::task::spawn_blocking(move || analyzer.compare(&feed, &image_a, &image_b))
        .await??;

    tracing::info!(
        %analysis_id,
        "Analysis complete - Image A: {}%, Image B: {}%",
        comparison.image_a_score,
        comparison.image_b_score
    );

    Ok(Json(CompareResponse::new(comparison, analysis_id)))
}
