use serde::Serialize;
use uuid::Uuid;

use crate::{api::NotesApi, Note, NoteForm, Views};

pub const FETCH_FAILED: &str = "Failed to fetch notes";
pub const SAVE_FAILED: &str = "Failed to save note";
pub const DELETE_FAILED: &str = "Failed to delete note";

/// What the list area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Status {
    Loading,
    Loaded,
    Failed(&'static str),
}

/// State of the notes page for one session.
///
/// The list is never patched locally: every successful mutation is followed
/// by a full reload from the API.
#[derive(Debug)]
pub struct NotesView<A> {
    api: A,
    notes: Vec<Note>,
    status: Status,
    form: NoteForm,
    editing: Option<Uuid>,
}

#[derive(Serialize)]
struct PageContext<'a> {
    notes: &'a [Note],
    status: Status,
    form: &'a NoteForm,
    editing: Option<Uuid>,
}

impl<A: NotesApi> NotesView<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            notes: Vec::new(),
            status: Status::Loading,
            form: NoteForm::default(),
            editing: None,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn form(&self) -> &NoteForm {
        &self.form
    }

    /// Id of the note the form is bound to, if any.
    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.form.content = content.into();
    }

    /// Replaces the cached list with the server's.
    pub async fn load(&mut self) {
        self.status = Status::Loading;

        match self.api.list_notes().await {
            Ok(notes) => {
                self.notes = notes;
                self.status = Status::Loaded;
            }
            Err(error) => {
                tracing::warn!("{error}");
                self.status = Status::Failed(FETCH_FAILED);
            }
        }
    }

    /// Creates a note, or updates the one being edited. An incomplete form
    /// sends nothing.
    pub async fn submit(&mut self) {
        if !self.form.is_complete() {
            return;
        }

        let saved = match self.editing {
            Some(id) => self.api.update_note(id, &self.form).await,
            None => self.api.create_note(&self.form).await,
        };

        match saved {
            Ok(_) => {
                self.form = NoteForm::default();
                self.editing = None;
                self.load().await;
            }
            Err(error) => {
                tracing::warn!("{error}");
                self.status = Status::Failed(SAVE_FAILED);
            }
        }
    }

    pub fn edit(&mut self, note: &Note) {
        self.form = NoteForm::from(note);
        self.editing = Some(note.id);
    }

    pub fn cancel(&mut self) {
        self.form = NoteForm::default();
        self.editing = None;
    }

    /// Deletes `id` once `confirm` agrees. Deleting the note under edit also
    /// leaves edit mode.
    pub async fn delete(&mut self, id: Uuid, confirm: impl FnOnce() -> bool) {
        if !confirm() {
            return;
        }

        match self.api.delete_note(id).await {
            Ok(()) => {
                if self.editing == Some(id) {
                    self.cancel();
                }
                self.load().await;
            }
            Err(error) => {
                tracing::warn!("{error}");
                self.status = Status::Failed(DELETE_FAILED);
            }
        }
    }

    pub fn render(&self, views: &Views) -> Result<String, minijinja::Error> {
        views.render("notes.html", self.page_context())
    }

    /// Only the `list` block of the page.
    pub fn render_list(&self, views: &Views) -> Result<String, minijinja::Error> {
        views.render("notes.html#list", self.page_context())
    }

    fn page_context(&self) -> PageContext<'_> {
        PageContext {
            notes: &self.notes,
            status: self.status,
            form: &self.form,
            editing: self.editing,
        }
    }
}
