use axum::{routing::get, Router};

pub mod common;
pub mod dashboard;
pub mod inquiries;
pub mod orders;
pub mod pricing;
pub mod publications;
pub mod system;

/// Router for all domain endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/pricing", pricing::router())
        .nest("/orders", orders::router())
        .nest("/inquiries", inquiries::router())
        .nest("/publications", publications::router())
        .nest("/dashboard", dashboard::router())
}
