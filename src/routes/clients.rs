use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderName, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    dto::clients::{ClientList, ClientOption, CreateClientRequest, QuickCreateRequest},
    error::AppResult,
    models::Client,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::client_service,
    state::AppState,
};

/// Side-channel header telling the order form a client was just created, so
/// it refreshes its dependent equipment choices.
pub const CLIENT_CREATED_HEADER: &str = "x-client-created";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/{id}", get(get_client).delete(delete_client))
        .route("/quick-create", post(quick_create))
}

#[utoipa::path(
    get,
    path = "/api/clients",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List clients", body = ApiResponse<ClientList>),
    ),
    tag = "Clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ClientList>>> {
    let resp = client_service::list_clients(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    params(("id" = i64, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client", body = ApiResponse<Client>),
        (status = 404, description = "Client not found"),
    ),
    tag = "Clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Client>>> {
    let resp = client_service::get_client(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = CreateClientRequest,
    responses(
        (status = 200, description = "Client created", body = ApiResponse<Client>),
        (status = 400, description = "Missing name or duplicate tax id"),
    ),
    tag = "Clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClientRequest>,
) -> AppResult<Json<ApiResponse<Client>>> {
    let resp = client_service::create_client(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(("id" = i64, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client deleted along with its equipment, orders and items"),
        (status = 404, description = "Client not found"),
    ),
    tag = "Clients"
)]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = client_service::delete_client(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/clients/quick-create",
    request_body = QuickCreateRequest,
    responses(
        (status = 201, description = "Client and equipment created; the new client comes back pre-selected", body = ApiResponse<ClientOption>),
        (status = 400, description = "Missing required field; nothing created"),
    ),
    tag = "Clients"
)]
pub async fn quick_create(
    State(state): State<AppState>,
    Json(payload): Json<QuickCreateRequest>,
) -> AppResult<impl IntoResponse> {
    let option = client_service::quick_create(&state, payload).await?;

    let headers = [(
        HeaderName::from_static(CLIENT_CREATED_HEADER),
        option.value.to_string(),
    )];
    let body = Json(ApiResponse::success(
        "Client created",
        option,
        Some(Meta::empty()),
    ));
    Ok((StatusCode::CREATED, headers, body))
}
