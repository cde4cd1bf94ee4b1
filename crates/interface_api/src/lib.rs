//! HTTP API Layer
//!
//! REST API of the KLK Auto Car rental system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: catalog, reservation wizard sessions, admin console
//! - **Middleware**: admin authentication, audit logging, request ids
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: JSON `{error, message, details}` bodies
//!
//! # Routes
//!
//! | Scope  | Path                                   |
//! |--------|----------------------------------------|
//! | public | `/health`, `/health/ready`             |
//! | public | `/api/v1/vehicles`, `/api/v1/locations` |
//! | public | `/api/v1/wizard/...`                   |
//! | admin  | `/api/v1/admin/...` (bearer JWT)       |
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, Adapters};
//!
//! let state = AppState::new(config, Adapters::live(pool, store))?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, catalog, health, wizard};
use crate::middleware::{audit_middleware, auth_middleware};

pub use crate::state::{Adapters, AppState, WizardSessions};

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Services and sessions shared by every handler
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    // Public routes (no auth required)
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let catalog_routes = Router::new()
        .route("/vehicles", get(catalog::list_vehicles))
        .route("/vehicles/:id", get(catalog::get_vehicle))
        .route("/locations", get(catalog::list_locations));

    let wizard_routes = Router::new()
        .route("/", post(wizard::create_session))
        .route("/:id", get(wizard::get_session).delete(wizard::abandon_session))
        .route("/:id/vehicle", put(wizard::select_vehicle))
        .route("/:id/schedule", put(wizard::set_schedule))
        .route("/:id/personal-info", put(wizard::set_personal_info))
        .route(
            "/:id/documents/:slot",
            put(wizard::attach_document).delete(wizard::remove_document),
        )
        .route("/:id/terms", put(wizard::accept_terms))
        .route("/:id/navigate", post(wizard::navigate))
        .route("/:id/submit", post(wizard::submit));

    let public_api = Router::new()
        .merge(catalog_routes)
        .nest("/wizard", wizard_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    // Admin routes
    let fleet_routes = Router::new()
        .route("/", get(catalog::list_all_vehicles).post(catalog::create_vehicle))
        .route("/:id", put(catalog::update_vehicle).delete(catalog::delete_vehicle))
        .route("/:id/availability", post(catalog::toggle_availability))
        .route("/:id/photo", put(catalog::upload_photo));

    let reservation_routes = Router::new()
        .route("/", get(admin::list_reservations))
        .route("/:id/status", put(admin::change_status))
        .route("/:id/payment", put(admin::set_payment_status));

    let client_routes = Router::new()
        .route("/", get(admin::list_clients))
        .route("/:id/reliability", put(admin::rate_client));

    let admin_api = Router::new()
        .nest("/vehicles", fleet_routes)
        .nest("/reservations", reservation_routes)
        .nest("/clients", client_routes)
        .route("/dashboard", get(admin::dashboard))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(health_routes)
        .nest("/api/v1", public_api.nest("/admin", admin_api))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
