use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    dto::clients::{ClientList, ClientOption, CreateClientRequest, QuickCreateRequest},
    entity::{
        clients::{
            ActiveModel as ClientActive, Column as ClientCol, Entity as Clients,
            Model as ClientModel,
        },
        equipment::ActiveModel as EquipmentActive,
    },
    error::{AppError, AppResult},
    models::{Client, EquipmentKind},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_clients(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ClientList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Clients::find().order_by_desc(ClientCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(client_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Clients", ClientList { items }, Some(meta)))
}

pub async fn get_client(state: &AppState, id: i64) -> AppResult<ApiResponse<Client>> {
    let client = Clients::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Client",
        client_from_entity(client),
        Some(Meta::empty()),
    ))
}

pub async fn create_client(
    state: &AppState,
    payload: CreateClientRequest,
) -> AppResult<ApiResponse<Client>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }

    let tax_id = normalize_optional(payload.tax_id);
    ensure_tax_id_free(&state.orm, tax_id.as_deref()).await?;

    let client = ClientActive {
        id: NotSet,
        name: Set(name),
        tax_id: Set(tax_id),
        phone: Set(normalize_optional(payload.phone)),
        email: Set(normalize_optional(payload.email)),
        address: Set(normalize_optional(payload.address)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Client created",
        client_from_entity(client),
        Some(Meta::empty()),
    ))
}

pub async fn delete_client(
    state: &AppState,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    // Cascades remove the client's equipment, service orders and line items.
    let result = Clients::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Client deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Inline client+equipment creation used while filling in an order. Both rows
/// are written in one transaction; a missing required field writes nothing.
/// Tax id and phone stay optional, matching how the front desk actually works.
pub async fn quick_create(
    state: &AppState,
    payload: QuickCreateRequest,
) -> AppResult<ClientOption> {
    let name = required_field(payload.name, "name")?;
    let brand = required_field(payload.brand, "brand")?;
    let model = required_field(payload.model, "model")?;
    let serial = required_field(payload.serial, "serial")?;

    let tax_id = normalize_optional(payload.tax_id);
    ensure_tax_id_free(&state.orm, tax_id.as_deref()).await?;

    let txn = state.orm.begin().await?;

    let client = ClientActive {
        id: NotSet,
        name: Set(name),
        tax_id: Set(tax_id),
        phone: Set(normalize_optional(payload.phone)),
        email: Set(None),
        address: Set(None),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    // The quick path never asks for a type tag.
    EquipmentActive {
        id: NotSet,
        client_id: Set(client.id),
        kind: Set(EquipmentKind::Other.as_str().to_string()),
        brand: Set(brand),
        model: Set(model),
        serial_number: Set(Some(serial)),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(client_id = client.id, "quick-create stored client and equipment");

    Ok(ClientOption {
        value: client.id,
        label: client.name,
        selected: true,
    })
}

async fn ensure_tax_id_free<C: ConnectionTrait>(conn: &C, tax_id: Option<&str>) -> AppResult<()> {
    if let Some(tax_id) = tax_id {
        let taken = Clients::find()
            .filter(ClientCol::TaxId.eq(tax_id))
            .count(conn)
            .await?;
        if taken > 0 {
            return Err(AppError::BadRequest("Tax id already registered".into()));
        }
    }
    Ok(())
}

fn required_field(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required field '{field}'")))
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn client_from_entity(model: ClientModel) -> Client {
    Client {
        id: model.id,
        name: model.name,
        tax_id: model.tax_id,
        phone: model.phone,
        email: model.email,
        address: model.address,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_field_rejects_missing_and_blank() {
        assert!(required_field(None, "brand").is_err());
        assert!(required_field(Some("   ".into()), "brand").is_err());
        assert_eq!(required_field(Some(" Dell ".into()), "brand").unwrap(), "Dell");
    }

    #[test]
    fn blank_optionals_become_none() {
        assert_eq!(normalize_optional(Some("".into())), None);
        assert_eq!(normalize_optional(Some("  ".into())), None);
        assert_eq!(normalize_optional(Some(" 555 ".into())), Some("555".into()));
        assert_eq!(normalize_optional(None), None);
    }
}
