pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{status}: {message}")]
    Status { status: u16, message: String },
}
