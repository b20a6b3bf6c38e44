pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::get,
    Router,
};
use crate::http::state::AppState;
use self::auth::admin_gate;
use self::handlers::*;

/// Routes under `/admin`, guarded by [`admin_gate`].
pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin", get(get_overview))
        .route("/admin/debug", get(get_debug))
        .route("/admin/login", get(get_login))
        .route("/admin/access-denied", get(get_access_denied))
        .route_layer(middleware::from_fn_with_state(state, admin_gate))
}
