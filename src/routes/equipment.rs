use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};

use crate::{
    dto::equipment::{CreateEquipmentRequest, EquipmentList},
    error::AppResult,
    models::Equipment,
    response::ApiResponse,
    routes::params::EquipmentOptionsQuery,
    services::equipment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(equipment_options).post(create_equipment))
        .route("/{id}", delete(delete_equipment))
}

#[utoipa::path(
    get,
    path = "/api/equipment",
    params(
        ("client" = Option<String>, Query, description = "Client id; missing or malformed values yield an empty list"),
    ),
    responses(
        (status = 200, description = "The client's equipment ordered by brand", body = ApiResponse<EquipmentList>),
    ),
    tag = "Equipment"
)]
pub async fn equipment_options(
    State(state): State<AppState>,
    Query(query): Query<EquipmentOptionsQuery>,
) -> AppResult<Json<ApiResponse<EquipmentList>>> {
    let resp = equipment_service::options_for_client(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/equipment",
    request_body = CreateEquipmentRequest,
    responses(
        (status = 200, description = "Equipment created", body = ApiResponse<Equipment>),
        (status = 400, description = "Unknown client or invalid kind"),
    ),
    tag = "Equipment"
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    Json(payload): Json<CreateEquipmentRequest>,
) -> AppResult<Json<ApiResponse<Equipment>>> {
    let resp = equipment_service::create_equipment(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/equipment/{id}",
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment deleted along with its orders"),
        (status = 404, description = "Equipment not found"),
    ),
    tag = "Equipment"
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = equipment_service::delete_equipment(&state, id).await?;
    Ok(Json(resp))
}
