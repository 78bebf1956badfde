//! Browser-side half of the notes app: a client for the notes HTTP API, the
//! state machine behind the single notes page, and its HTML rendering.
//!
//! Hosting the page is left to the embedder. It maps form input and the
//! `data-action` buttons of `notes.html` onto [`NotesView`] calls and
//! re-renders afterwards.

mod api;
mod errors;
mod model;
mod view;
mod views;

pub use api::{HttpNotesApi, NotesApi};
pub use errors::{Error, Result};
pub use model::{Note, NoteForm};
pub use view::{NotesView, Status, DELETE_FAILED, FETCH_FAILED, SAVE_FAILED};
pub use views::Views;
