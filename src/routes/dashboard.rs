use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::orders::DashboardData,
    error::AppResult,
    response::ApiResponse,
    routes::params::DashboardQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    params(
        ("q" = Option<String>, Query, description = "Search term matched against order ids and client names"),
    ),
    responses(
        (status = 200, description = "Status counts plus recent or searched orders", body = ApiResponse<DashboardData>),
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<ApiResponse<DashboardData>>> {
    let resp = order_service::dashboard(&state, query).await?;
    Ok(Json(resp))
}
