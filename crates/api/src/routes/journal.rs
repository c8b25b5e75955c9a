//! Journal routes: producer postings, drafts, posting and reversal.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use folio_core::ledger::{
    EntryStatus, JournalEntry, PostingRequest, ReversalRequest, SourceModule, SubmitPosting,
};
use folio_shared::types::EntryId;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{ApiError, AppState};

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal", get(list_entries))
        .route("/journal/postings", post(submit_posting))
        .route("/journal/drafts", post(create_draft))
        .route(
            "/journal/drafts/{id}",
            put(update_draft).delete(delete_draft),
        )
        .route("/journal/{id}", get(get_entry))
        .route("/journal/{id}/post", post(post_entry))
        .route("/journal/{id}/reverse", post(reverse_entry))
}

/// Query parameters for listing entries.
#[derive(Debug, Default, Deserialize)]
pub struct JournalQuery {
    /// First date (inclusive).
    pub from: Option<NaiveDate>,
    /// Last date (inclusive).
    pub to: Option<NaiveDate>,
    /// Only this status.
    pub status: Option<EntryStatus>,
    /// Only entries from this module.
    pub source: Option<SourceModule>,
    /// Exact entry number.
    pub number: Option<String>,
}

impl JournalQuery {
    fn matches(&self, entry: &JournalEntry) -> bool {
        self.from.is_none_or(|from| entry.date >= from)
            && self.to.is_none_or(|to| entry.date <= to)
            && self.status.is_none_or(|status| entry.status == status)
            && self.source.is_none_or(|source| entry.source_module == source)
            && self
                .number
                .as_deref()
                .is_none_or(|number| entry.entry_number.as_deref() == Some(number))
    }
}

/// Request body for posting a draft.
#[derive(Debug, Deserialize)]
pub struct PostDraftRequest {
    /// Acting user.
    pub user: String,
}

/// GET `/journal` - List entries in posting order, drafts last.
async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<JournalQuery>,
) -> impl IntoResponse {
    let snapshot = state.ledger.snapshot();
    let mut entries: Vec<&JournalEntry> = snapshot
        .journal()
        .iter()
        .filter(|e| query.matches(e))
        .collect();
    entries.sort_by_key(|e| (e.posting_sequence.is_none(), e.posting_sequence, e.created_at));
    Json(json!({ "entries": entries }))
}

/// GET `/journal/{id}` - Fetch one entry.
async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
) -> Result<Json<JournalEntry>, ApiError> {
    let snapshot = state.ledger.snapshot();
    Ok(Json(snapshot.entry(id)?.clone()))
}

/// POST `/journal/postings` - Resolve, validate and post in one step.
async fn submit_posting(
    State(state): State<AppState>,
    Json(payload): Json<PostingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| s.submit_posting(payload))
        .await?;
    info!(
        entry_number = %entry.entry_number.as_deref().unwrap_or_default(),
        source = ?entry.source_module,
        total = %entry.total_debit,
        "Journal entry posted"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST `/journal/drafts` - Save an entry without posting it.
async fn create_draft(
    State(state): State<AppState>,
    Json(payload): Json<PostingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.ledger.transact(move |s| s.create_draft(payload)).await?;
    info!(entry_id = %entry.id, "Draft created");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT `/journal/drafts/{id}` - Replace a draft's content.
async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
    Json(payload): Json<PostingRequest>,
) -> Result<Json<JournalEntry>, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| s.update_draft(id, payload))
        .await?;
    info!(entry_id = %entry.id, "Draft updated");
    Ok(Json(entry))
}

/// DELETE `/journal/drafts/{id}` - Discard a draft.
async fn delete_draft(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
) -> Result<StatusCode, ApiError> {
    state.ledger.transact(move |s| s.delete_draft(id)).await?;
    info!(entry_id = %id, "Draft deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/journal/{id}/post` - Post a draft.
async fn post_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
    Json(payload): Json<PostDraftRequest>,
) -> Result<Json<JournalEntry>, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| s.post(id, &payload.user))
        .await?;
    info!(
        entry_number = %entry.entry_number.as_deref().unwrap_or_default(),
        "Draft posted"
    );
    Ok(Json(entry))
}

/// POST `/journal/{id}/reverse` - Post the mirror image of an entry.
async fn reverse_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
    Json(payload): Json<ReversalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reversal = state
        .ledger
        .transact(move |s| s.reverse(id, &payload))
        .await?;
    info!(
        original = %id,
        entry_number = %reversal.entry_number.as_deref().unwrap_or_default(),
        "Journal entry reversed"
    );
    Ok((StatusCode::CREATED, Json(reversal)))
}
