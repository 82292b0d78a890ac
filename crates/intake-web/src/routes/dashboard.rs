//! Dashboard route handler.
//!
//! Server-renders the current records; the page's script then keeps the table
//! live over `/ws/records/`.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use intake_core::RecordPayload;

use super::blocking;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    records: Vec<RecordPayload>,
}

/// GET / - Serve the intake dashboard.
pub async fn index(State(state): State<AppState>) -> Response {
    let records = match blocking(&state.db, |db| intake_core::record::list_records(db, None)).await {
        Ok(records) => records,
        Err(e) => return e.into_response(),
    };

    let template = DashboardTemplate {
        records: records
            .iter()
            .map(|record| RecordPayload::from_record(record, &state.config.media_url))
            .collect(),
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("Template error: {}", e)),
        )
            .into_response(),
    }
}
