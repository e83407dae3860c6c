use axum::{
    Json, Router,
    extract::{Path, State},
    routing::put,
};

use crate::{
    dto::line_items::UpdateLineItemRequest,
    error::AppResult,
    models::LineItem,
    response::ApiResponse,
    services::line_item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(update_item).delete(remove_item))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}",
    params(("id" = i64, Path, description = "Line item ID")),
    request_body = UpdateLineItemRequest,
    responses(
        (status = 200, description = "Line item updated; order total recomputed", body = ApiResponse<LineItem>),
        (status = 400, description = "Invalid line item"),
        (status = 404, description = "Line item not found"),
    ),
    tag = "Line Items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLineItemRequest>,
) -> AppResult<Json<ApiResponse<LineItem>>> {
    let resp = line_item_service::update_item(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    params(("id" = i64, Path, description = "Line item ID")),
    responses(
        (status = 200, description = "Line item deleted; order total recomputed"),
        (status = 404, description = "Line item not found"),
    ),
    tag = "Line Items"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = line_item_service::remove_item(&state, id).await?;
    Ok(Json(resp))
}
