use axum::{extract::State, http::StatusCode};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    openapi::{
        aide::axum::{routing::get_with, ApiRouter, IntoApiResponse},
        Json, Path,
    },
    state::AppState,
};

use super::{DeleteNoteResponse, Note, NoteId, NoteInput, NoteStore};

#[derive(Debug, Deserialize, JsonSchema)]
struct NoteIdPath {
    id: NoteId,
}

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/api/notes",
            get_with(list_notes, |t| t.description("List every note."))
                .post_with(create_note, |t| t.response::<201, Json<Note>>()),
        )
        .api_route(
            "/api/notes/{id}",
            get_with(get_note, |t| t.description("Fetch one note."))
                .put_with(update_note, |t| {
                    t.description("Replace the title and content of a note.")
                })
                .delete_with(delete_note, |t| t.description("Delete a note permanently.")),
        )
        .with_state(state)
}

async fn list_notes(State(store): State<NoteStore>) -> impl IntoApiResponse {
    store.list().await.map(Json)
}

async fn create_note(
    State(store): State<NoteStore>,
    Json(input): Json<NoteInput>,
) -> impl IntoApiResponse {
    store.create(input).await.map(|note| (StatusCode::CREATED, Json(note)))
}

async fn get_note(
    State(store): State<NoteStore>,
    Path(NoteIdPath { id }): Path<NoteIdPath>,
) -> impl IntoApiResponse {
    store.get(id).await.map(Json)
}

async fn update_note(
    State(store): State<NoteStore>,
    Path(NoteIdPath { id }): Path<NoteIdPath>,
    Json(input): Json<NoteInput>,
) -> impl IntoApiResponse {
    store.update(id, input).await.map(Json)
}

async fn delete_note(
    State(store): State<NoteStore>,
    Path(NoteIdPath { id }): Path<NoteIdPath>,
) -> impl IntoApiResponse {
    store.delete(id).await.map(|_| {
        Json(DeleteNoteResponse {
            message: "Note deleted".into(),
        })
    })
}
