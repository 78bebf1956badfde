mod model;
mod routes;
mod store;

pub use model::*;
pub use store::NoteStore;

use crate::{openapi::aide::axum::ApiRouter, state::AppState};

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new().merge(routes::router(state))
}
