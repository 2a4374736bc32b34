//! Handlers for notebooks, sections and notes.
//!
//! Listings render notes as [`NoteView`], which drops the content of locked
//! notes. Fetching a single note returns it in full for editing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use detailhq_core::notes::{
    Note, NoteDraft, NotePatch, NoteView, NotebookDraft, SectionDraft, SectionScope,
};
use detailhq_core::types::EntityId;
use detailhq_store::notes_store::{NoteSelection, NotesStore};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::query::{SectionListParams, VisibleNotesParams};
use crate::response::{DataResponse, SyncedResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SectionRename {
    pub name: String,
}

/// Body of `PUT /notes/selection`. Fields are applied in hierarchy order,
/// so choosing a notebook resets the section and note first.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionInput {
    #[serde(default, deserialize_with = "double_option")]
    pub notebook_id: Option<Option<EntityId>>,
    pub section: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub note_id: Option<Option<EntityId>>,
    pub search: Option<String>,
}

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Serialize)]
pub struct NotebookDeleted {
    pub notebook_id: EntityId,
    pub section_ids: Vec<EntityId>,
    pub note_ids: Vec<EntityId>,
}

#[derive(Debug, Serialize)]
pub struct SectionDeleted {
    pub section_id: EntityId,
    pub note_ids: Vec<EntityId>,
}

fn views(notes: &[Note]) -> Vec<NoteView> {
    notes.iter().map(NoteView::from).collect()
}

// ---------------------------------------------------------------------------
// /notebooks
// ---------------------------------------------------------------------------

pub async fn list_notebooks(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    store.refresh().await?;
    let notebooks = store.notebooks().to_vec();
    Ok(Json(SyncedResponse::new(notebooks, store.status())))
}

pub async fn create_notebook(
    State(state): State<AppState>,
    Json(input): Json<NotebookDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let notebook = store.create_notebook(input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(notebook, store.status())),
    ))
}

pub async fn get_notebook(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let store = state.stores.notes.lock().await;
    let notebook = store.get_notebook(id)?.clone();
    Ok(Json(SyncedResponse::new(notebook, store.status())))
}

pub async fn update_notebook(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<NotebookDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let notebook = store.update_notebook(id, input, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(notebook, store.status())))
}

/// DELETE /notebooks/{id}
///
/// Cascades to the notebook's sections and every note in it.
pub async fn delete_notebook(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let (section_ids, note_ids) = store.delete_notebook(id)?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(
        NotebookDeleted {
            notebook_id: id,
            section_ids,
            note_ids,
        },
        store.status(),
    )))
}

// ---------------------------------------------------------------------------
// /sections
// ---------------------------------------------------------------------------

pub async fn list_sections(
    State(state): State<AppState>,
    Query(params): Query<SectionListParams>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    store.refresh().await?;
    let sections = store.sections(params.notebook_id);
    Ok(Json(SyncedResponse::new(sections, store.status())))
}

pub async fn create_section(
    State(state): State<AppState>,
    Json(input): Json<SectionDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let section = store.create_section(input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(section, store.status())),
    ))
}

pub async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let store = state.stores.notes.lock().await;
    let section = store.get_section(id)?.clone();
    Ok(Json(SyncedResponse::new(section, store.status())))
}

pub async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<SectionRename>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let section = store.update_section(id, &input.name, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(section, store.status())))
}

/// DELETE /sections/{id}
///
/// Cascades to the section's notes.
pub async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let note_ids = store.delete_section(id)?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(
        SectionDeleted {
            section_id: id,
            note_ids,
        },
        store.status(),
    )))
}

// ---------------------------------------------------------------------------
// /notes
// ---------------------------------------------------------------------------

pub async fn list_notes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    store.refresh().await?;
    let notes = views(store.notes());
    Ok(Json(SyncedResponse::new(notes, store.status())))
}

/// GET /notes/visible
///
/// Starts from the stored selection and applies any query overrides for
/// this request only. A non-empty `q` searches every notebook.
pub async fn visible_notes(
    State(state): State<AppState>,
    Query(params): Query<VisibleNotesParams>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    store.refresh().await?;

    let mut selection = store.selection().clone();
    if let Some(notebook_id) = params.notebook_id {
        selection.set_active_notebook(Some(notebook_id));
    }
    if let Some(section) = params.section.as_deref() {
        selection.set_active_section(SectionScope::parse(section)?);
    }
    if let Some(q) = params.q {
        selection.set_search(q);
    }

    let notes = views(&store.visible_for(&selection));
    Ok(Json(SyncedResponse::new(notes, store.status())))
}

pub async fn get_selection(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.stores.notes.lock().await;
    Ok(Json(DataResponse {
        data: store.selection().clone(),
    }))
}

/// PUT /notes/selection
pub async fn set_selection(
    State(state): State<AppState>,
    Json(input): Json<SelectionInput>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    apply_selection(&mut store, input)?;
    let selection: NoteSelection = store.selection().clone();
    Ok(Json(DataResponse { data: selection }))
}

fn apply_selection(store: &mut NotesStore, input: SelectionInput) -> AppResult<()> {
    if let Some(notebook_id) = input.notebook_id {
        if let Some(id) = notebook_id {
            store.get_notebook(id)?;
        }
        store.set_active_notebook(notebook_id);
    }
    if let Some(section) = input.section.as_deref() {
        let scope = SectionScope::parse(section)?;
        if let SectionScope::Section(id) = scope {
            store.get_section(id)?;
        }
        store.set_active_section(scope);
    }
    if let Some(note_id) = input.note_id {
        if let Some(id) = note_id {
            store.get_note(id)?;
        }
        store.set_active_note(note_id);
    }
    if let Some(search) = input.search {
        store.set_search(search);
    }
    Ok(())
}

pub async fn create_note(
    State(state): State<AppState>,
    Json(input): Json<NoteDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let note = store.create_note(input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(note, store.status())),
    ))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let store = state.stores.notes.lock().await;
    let note = store.get_note(id)?.clone();
    Ok(Json(SyncedResponse::new(note, store.status())))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<NotePatch>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let note = store.update_note(id, input, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(note, store.status())))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let note = store.delete_note(id)?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(note, store.status())))
}

/// PATCH /notes/{id}/pin
pub async fn toggle_pin(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let note = store.toggle_pin(id, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(NoteView::from(&note), store.status())))
}

/// PATCH /notes/{id}/lock
pub async fn toggle_lock(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.notes.lock().await;
    let note = store.toggle_lock(id, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(NoteView::from(&note), store.status())))
}
