//! Route definitions for the `/intake` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::intake;
use crate::state::AppState;

/// Routes mounted at `/intake`.
///
/// ```text
/// GET    /steps                  -> list_steps      (?enabledChecks)
/// POST   /steps/{step}/validate  -> validate_step
/// POST   /steps/{step}/advance   -> advance_step
/// POST   /resume                 -> resume
/// POST   /coverage               -> coverage
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/steps", get(intake::list_steps))
        .route("/steps/{step}/validate", post(intake::validate_step))
        .route("/steps/{step}/advance", post(intake::advance_step))
        .route("/resume", post(intake::resume))
        .route("/coverage", post(intake::coverage))
}
