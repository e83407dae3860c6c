use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    dto::equipment::{CreateEquipmentRequest, EquipmentList},
    entity::{
        clients::Entity as Clients,
        equipment::{
            ActiveModel as EquipmentActive, Column as EquipCol, Entity as EquipmentEnt,
            Model as EquipmentModel,
        },
    },
    error::{AppError, AppResult},
    models::{Equipment, EquipmentKind},
    response::{ApiResponse, Meta},
    routes::params::EquipmentOptionsQuery,
    state::AppState,
};

/// Equipment choices for the order form's dependent dropdown. A missing,
/// malformed or unknown client id means "no selection yet" and yields an
/// empty list, never an error.
pub async fn options_for_client(
    state: &AppState,
    query: EquipmentOptionsQuery,
) -> AppResult<ApiResponse<EquipmentList>> {
    let client_id = query
        .client
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok());

    let items = match client_id {
        Some(id) => EquipmentEnt::find()
            .filter(EquipCol::ClientId.eq(id))
            .order_by_asc(EquipCol::Brand)
            .all(&state.orm)
            .await?
            .into_iter()
            .map(equipment_from_entity)
            .collect(),
        None => Vec::new(),
    };

    Ok(ApiResponse::success(
        "Equipment",
        EquipmentList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_equipment(
    state: &AppState,
    payload: CreateEquipmentRequest,
) -> AppResult<ApiResponse<Equipment>> {
    let kind = EquipmentKind::parse(payload.kind.trim())
        .ok_or_else(|| AppError::BadRequest(format!("Unknown equipment kind '{}'", payload.kind)))?;

    if payload.brand.trim().is_empty() || payload.model.trim().is_empty() {
        return Err(AppError::BadRequest("Brand and model are required".into()));
    }

    Clients::find_by_id(payload.client_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown client".into()))?;

    let equipment = EquipmentActive {
        id: NotSet,
        client_id: Set(payload.client_id),
        kind: Set(kind.as_str().to_string()),
        brand: Set(payload.brand.trim().to_string()),
        model: Set(payload.model.trim().to_string()),
        serial_number: Set(payload
            .serial_number
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Equipment created",
        equipment_from_entity(equipment),
        Some(Meta::empty()),
    ))
}

pub async fn delete_equipment(
    state: &AppState,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    // Cascades remove the equipment's service orders and their line items.
    let result = EquipmentEnt::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Equipment deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn equipment_from_entity(model: EquipmentModel) -> Equipment {
    Equipment {
        id: model.id,
        client_id: model.client_id,
        kind: EquipmentKind::parse(&model.kind).unwrap_or_default(),
        brand: model.brand,
        model: model.model,
        serial_number: model.serial_number,
    }
}
