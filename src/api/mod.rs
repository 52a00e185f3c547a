//! The HTTP API, one module per resource.

use axum::Router;

use crate::infra::state::AppState;

pub mod item;
pub mod list;

/// Constructs the REST API.
pub fn api(state: AppState) -> Router {
    Router::new()
        .merge(item::item_api::routes())
        .merge(list::list_api::routes())
        .with_state(state)
}
