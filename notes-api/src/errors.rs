use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Request,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{db, notes::ValidationError};

pub type Result<T> = std::result::Result<T, Error>;

pub const NOTE_NOT_FOUND: &str = "Note not found";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    /// The request body is not JSON or does not fit the expected shape.
    #[error("{}", .0.body_text())]
    JsonValidation(#[from] JsonRejection),

    #[error(transparent)]
    DB(db::Error),
}

impl Error {
    pub fn not_found_message(self, message: impl Into<String>) -> Self {
        match self {
            Self::NotFound(_) => Self::NotFound(message.into()),
            error => error,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::JsonValidation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DB(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        match error {
            db::Error::NotFound(msg) => Self::NotFound(msg),
            error => Self::DB(error),
        }
    }
}

/// A path id that does not parse cannot name a stored note.
impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("{}", rejection.body_text());
        Self::NotFound(NOTE_NOT_FOUND.into())
    }
}

/// crate::Error <--> tokio_rusqlite::Error
/// ```rust
/// impl From<tokio_rusqlite::Error> for Error { }
/// impl From<ValidationError> for tokio_rusqlite::Error { }
/// ```
pub mod db_mappers {
    use super::*;
    use crate::db::tokio_rusqlite;

    impl From<tokio_rusqlite::Error> for Error {
        fn from(error: tokio_rusqlite::Error) -> Self {
            match error {
                tokio_rusqlite::Error::Other(err) => match err.downcast::<ValidationError>() {
                    Ok(validation) => Error::Validation(*validation),
                    Err(err) => Error::from(db::Error::from(tokio_rusqlite::Error::Other(err))),
                },
                error => Error::from(db::Error::from(error)),
            }
        }
    }

    impl From<ValidationError> for tokio_rusqlite::Error {
        fn from(error: ValidationError) -> Self {
            tokio_rusqlite::Error::Other(Box::new(error))
        }
    }
}

// Response

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error = Arc::new(self);

        let mut res = (status, axum::Json(ErrorResponse::from(error.as_ref()))).into_response();
        res.extensions_mut().insert(error);
        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let error = response.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    if let Some(error) = error {
        match error {
            Error::DB(_) => tracing::error!("{:?}", error),
            _ => tracing::warn!("{}", error),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tokio_rusqlite;

    #[test]
    fn maps_errors_to_status() {
        let validation = Error::from(ValidationError::new(vec!["title"]));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let not_found =
            Error::from(db::Error::NotFound("Not found".into())).not_found_message(NOTE_NOT_FOUND);
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorResponse::from(&not_found).error, "Note not found");

        let store = Error::from(db::Error::TokioRusqlite(tokio_rusqlite::Error::ConnectionClosed));
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn recovers_validation_error_from_connection_call() {
        let error = Error::from(tokio_rusqlite::Error::from(ValidationError::new(vec!["content"])));

        assert!(matches!(error, Error::Validation(_)));
        assert_eq!(error.to_string(), "Note validation failed: content required");
    }

    #[test]
    fn store_errors_surface_their_message() {
        let error = Error::from(tokio_rusqlite::Error::ConnectionClosed);

        assert!(matches!(error, Error::DB(_)));
        assert_eq!(
            ErrorResponse::from(&error).error,
            tokio_rusqlite::Error::ConnectionClosed.to_string()
        );
    }
}
