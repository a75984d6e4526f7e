pub mod admin;
pub mod config;
pub mod db;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::services::repetition::SelectionPolicy;
use crate::state::AppState;

pub fn create_app(db: Database, policy: SelectionPolicy) -> axum::Router {
    let state = AppState::new(db, policy);

    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
