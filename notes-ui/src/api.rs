use std::future::Future;

use reqwest::{Client, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Error, Note, NoteForm, Result};

/// The calls the notes page makes. One method per endpoint.
pub trait NotesApi {
    fn list_notes(&self) -> impl Future<Output = Result<Vec<Note>>> + Send;
    fn create_note(&self, form: &NoteForm) -> impl Future<Output = Result<Note>> + Send;
    fn update_note(&self, id: Uuid, form: &NoteForm) -> impl Future<Output = Result<Note>> + Send;
    fn delete_note(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpNotesApi {
    client: Client,
    notes_url: String,
}

impl HttpNotesApi {
    /// `base_url` is the server root, e.g. `http://localhost:4000`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            notes_url: format!("{}/api/notes", base_url.trim_end_matches('/')),
        }
    }

    fn note_url(&self, id: Uuid) -> String {
        format!("{}/{id}", self.notes_url)
    }
}

impl Default for HttpNotesApi {
    fn default() -> Self {
        Self::new("http://localhost:4000")
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };

    Err(Error::Status {
        status: status.as_u16(),
        message,
    })
}

impl NotesApi for HttpNotesApi {
    async fn list_notes(&self) -> Result<Vec<Note>> {
        let response = self.client.get(&self.notes_url).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create_note(&self, form: &NoteForm) -> Result<Note> {
        let response = self.client.post(&self.notes_url).json(form).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update_note(&self, id: Uuid, form: &NoteForm) -> Result<Note> {
        let response = self.client.put(self.note_url(id)).json(form).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete_note(&self, id: Uuid) -> Result<()> {
        let response = self.client.delete(self.note_url(id)).send().await?;
        check(response).await?;
        Ok(())
    }
}
