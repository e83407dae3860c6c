use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    dto::{
        line_items::{CreateLineItemRequest, LineItemList},
        orders::{CreateOrderRequest, OrderWithItems, UpdateOrderRequest},
    },
    error::AppResult,
    models::LineItem,
    response::ApiResponse,
    services::{line_item_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/{id}", get(get_order).put(update_order))
        .route("/{id}/pdf", get(export_order_pdf))
        .route("/{id}/items", get(list_items).post(add_item))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created as 'open' with a 0.00 total", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid payload or equipment not owned by the client"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::create_order(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with client, equipment and items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Updated order", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::update_order(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/pdf",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Printable order document", content_type = "application/pdf"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Document rendering failed"),
    ),
    tag = "Orders"
)]
pub async fn export_order_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let bytes = order_service::export_document(&state, id).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"os_{id}.pdf\""),
        ),
    ];
    Ok((headers, bytes))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/items",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Line items of the order", body = ApiResponse<LineItemList>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Line Items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<LineItemList>>> {
    let resp = line_item_service::list_items(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/items",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = CreateLineItemRequest,
    responses(
        (status = 200, description = "Line item added; order total recomputed", body = ApiResponse<LineItem>),
        (status = 400, description = "Invalid line item"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Line Items"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateLineItemRequest>,
) -> AppResult<Json<ApiResponse<LineItem>>> {
    let resp = line_item_service::add_item(&state, id, payload).await?;
    Ok(Json(resp))
}
