pub mod health;
pub mod intake;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /intake
///     /steps                       reachable steps (?enabledChecks)
///     /steps/{step}/validate       validate one step
///     /steps/{step}/advance        validate and move to the next step
///     /resume                      resume step for a persisted record
///     /coverage                    merged coverage of date intervals
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/intake", intake::router())
}
