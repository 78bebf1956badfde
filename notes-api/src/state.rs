use axum::extract::FromRef;

use crate::notes::NoteStore;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub store: NoteStore,
}
