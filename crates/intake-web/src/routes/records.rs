//! Record route handlers.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use intake_core::record::form::validate_photo;
use intake_core::{BroadcastEvent, FieldErrors, RecordForm, RecordPayload, RECORDS_TOPIC};
use serde::Deserialize;
use tracing::{debug, info};

use super::blocking;
use crate::error::WebError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

/// Error key for problems not tied to one form field.
const NON_FIELD_ERRORS: &str = "__all__";

struct Upload {
    extension: String,
    data: Bytes,
}

/// POST /records/create/ - Register a new intake from the multipart form.
///
/// Responds with the serialized record and publishes it to live dashboards.
/// Invalid submissions get a 400 with per-field messages and are not published.
pub async fn create_record(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RecordPayload>, WebError> {
    let mut form = RecordForm::default();
    let mut uploads = Vec::new();
    let mut errors = FieldErrors::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(NON_FIELD_ERRORS, e))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "photos" {
            let filename = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error("photos", e))?;
            // Browsers send an empty, unnamed part when no file was picked.
            if data.is_empty() && filename.as_deref().map_or(true, str::is_empty) {
                continue;
            }
            match validate_photo(filename.as_deref(), data.len()) {
                Ok(extension) => uploads.push(Upload { extension, data }),
                Err(message) => errors.add("photos", message),
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(&name, e))?;
            if !form.set_field(&name, value) {
                debug!(field = %name, "Ignoring unknown form field");
            }
        }
    }

    let new_record = match form.validate() {
        Ok(record) if errors.is_empty() => record,
        Ok(_) => return Err(WebError::Validation(errors)),
        Err(field_errors) => {
            errors.extend(field_errors);
            return Err(WebError::Validation(errors));
        }
    };

    let mut images = Vec::with_capacity(uploads.len());
    for upload in &uploads {
        match state.photos.store(&upload.extension, &upload.data).await {
            Ok(image) => images.push(image),
            Err(e) => {
                state.photos.remove_all(&images).await;
                return Err(e);
            }
        }
    }

    let stored = images.clone();
    let record = match blocking(&state.db, move |db| {
        intake_core::record::create_record(db, &new_record, &stored)
    })
    .await
    {
        Ok(record) => record,
        Err(e) => {
            state.photos.remove_all(&images).await;
            return Err(e);
        }
    };

    let payload = RecordPayload::from_record(&record, &state.config.media_url);
    info!(record_id = record.id, record = %record.label(), "Intake registered");

    state
        .broadcaster
        .publish(RECORDS_TOPIC, &BroadcastEvent::RecordCreated(payload.clone()))
        .await;

    Ok(Json(payload))
}

/// Report an unreadable multipart body as field errors. An over-limit body is
/// charged to `photos`, the only field that can grow that large.
fn multipart_error(field: &str, err: MultipartError) -> WebError {
    let mut errors = FieldErrors::new();
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        errors.add("photos", "The submission is too large. Upload fewer or smaller photos.");
        return WebError::TooLarge(errors);
    }
    debug!(field, error = %err, "Unreadable multipart body");
    errors.add(field, err.body_text());
    WebError::Validation(errors)
}

/// GET /api/records - List records newest first, optionally filtered by `q`.
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<RecordPayload>>, WebError> {
    let limit = query.limit;
    let mut records = blocking(&state.db, move |db| match query.q {
        Some(term) => intake_core::record::search_records(db, &term),
        None => intake_core::record::list_records(db, limit),
    })
    .await?;
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    let media_url = &state.config.media_url;
    Ok(Json(
        records
            .iter()
            .map(|record| RecordPayload::from_record(record, media_url))
            .collect(),
    ))
}

/// GET /api/records/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecordPayload>, WebError> {
    let record = blocking(&state.db, move |db| intake_core::record::get_record(db, id)).await?;
    Ok(Json(RecordPayload::from_record(&record, &state.config.media_url)))
}
