//! API routes: module listing, entity CRUD, lifecycle and workflow
//! operations. Paths are parameterized; handlers resolve the entity from
//! the module segment at request time.

use crate::handlers::{entity, lifecycle, modules, workflow};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/modules", get(modules::list_modules))
        .route("/:module", get(entity::list).post(entity::create))
        .route(
            "/:module/:id",
            get(entity::read)
                .patch(entity::update)
                .delete(lifecycle::soft_delete),
        )
        .route("/:module/:id/toggle", post(lifecycle::toggle_status))
        .route("/:module/:id/status", post(workflow::change_status))
        .route("/:module/:id/status/options", get(workflow::status_options))
        .with_state(state)
}
