use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/access/permissions/{permission_key}",
            get(handlers::permission_check_handler),
        )
        .route(
            "/api/access/modules/{module_id}/scope",
            get(handlers::view_scope_handler),
        )
        .route(
            "/api/access/modules/{module_id}/record-visibility",
            get(handlers::record_visibility_handler),
        )
        .route(
            "/api/admin/roles/{role_id}/permissions",
            get(handlers::role_permission_matrix_handler),
        )
        .route(
            "/api/admin/roles/{role_id}/permissions/{permission_key}/toggle",
            post(handlers::toggle_permission_handler),
        )
        .route(
            "/api/admin/roles/{role_id}/modules/{module_id}/scope",
            put(handlers::set_view_scope_handler),
        )
        .route(
            "/api/admin/roles/{role_id}/modules/{module_id}/selection",
            put(handlers::set_select_all_handler),
        )
        .route(
            "/api/admin/roles/{role_id}/modules/{module_id}/selection/click",
            post(handlers::click_select_all_handler),
        )
        .route(
            "/api/entitlements/me",
            get(handlers::entitlement_overview_handler),
        )
        .route(
            "/api/entitlements/me/trial",
            get(handlers::trial_status_handler),
        )
        .route(
            "/api/entitlements/me/tiers/{plan_tier}",
            get(handlers::tier_access_handler),
        )
        .route(
            "/api/entitlements/me/teaser",
            get(handlers::teaser_lock_states_handler),
        )
        .route_layer(from_fn(middleware::require_identity));

    let billing_routes = Router::new()
        .route(
            "/api/internal/billing/entitlements/{subject}",
            put(handlers::replace_entitlement_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_billing_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(protected_routes)
        .merge(billing_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
