use axum::Router;

use crate::state::AppState;

pub mod clients;
pub mod dashboard;
pub mod doc;
pub mod equipment;
pub mod health;
pub mod line_items;
pub mod orders;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/dashboard", dashboard::router())
        .nest("/orders", orders::router())
        .nest("/items", line_items::router())
        .nest("/equipment", equipment::router())
        .nest("/clients", clients::router())
}
