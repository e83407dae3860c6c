use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    dto::line_items::{CreateLineItemRequest, LineItemList, UpdateLineItemRequest},
    entity::{
        line_items::{
            ActiveModel as ItemActive, Column as ItemCol, Entity as LineItems, Model as ItemModel,
        },
        service_orders::{ActiveModel as OrderActive, Entity as ServiceOrders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    models::LineItem,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_items(state: &AppState, order_id: i64) -> AppResult<ApiResponse<LineItemList>> {
    ServiceOrders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = LineItems::find()
        .filter(ItemCol::OrderId.eq(order_id))
        .order_by_asc(ItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(line_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Line items",
        LineItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn add_item(
    state: &AppState,
    order_id: i64,
    payload: CreateLineItemRequest,
) -> AppResult<ApiResponse<LineItem>> {
    let description = validate_description(&payload.description)?;
    let quantity = validate_quantity(payload.quantity.unwrap_or(1))?;
    let unit_price = validate_unit_price(payload.unit_price)?;

    let txn = state.orm.begin().await?;

    // Lock the order row before touching its items: concurrent writes against
    // the same order serialize here, so the stored total always reflects the
    // final item set.
    let order = lock_order(&txn, order_id).await?;

    let item = ItemActive {
        id: NotSet,
        order_id: Set(order.id),
        description: Set(description),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
    }
    .insert(&txn)
    .await?;

    recompute_total(&txn, order).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Line item added",
        line_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    item_id: i64,
    payload: UpdateLineItemRequest,
) -> AppResult<ApiResponse<LineItem>> {
    let txn = state.orm.begin().await?;

    let existing = LineItems::find_by_id(item_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let order = lock_order(&txn, existing.order_id).await?;

    let description = match payload.description {
        Some(raw) => validate_description(&raw)?,
        None => existing.description.clone(),
    };
    let quantity = validate_quantity(payload.quantity.unwrap_or(existing.quantity))?;
    let unit_price = validate_unit_price(payload.unit_price.unwrap_or(existing.unit_price))?;

    let mut active: ItemActive = existing.into();
    active.description = Set(description);
    active.quantity = Set(quantity);
    active.unit_price = Set(unit_price);
    let item = active.update(&txn).await?;

    recompute_total(&txn, order).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Line item updated",
        line_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    item_id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let existing = LineItems::find_by_id(item_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let order = lock_order(&txn, existing.order_id).await?;

    existing.delete(&txn).await?;

    recompute_total(&txn, order).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Line item deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn lock_order<C: ConnectionTrait>(conn: &C, order_id: i64) -> AppResult<OrderModel> {
    ServiceOrders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Recompute and persist the order's total from its current line items,
/// inside the caller's transaction. An order with no items goes back to
/// exactly 0.00.
async fn recompute_total<C: ConnectionTrait>(conn: &C, order: OrderModel) -> AppResult<Decimal> {
    let items = LineItems::find()
        .filter(ItemCol::OrderId.eq(order.id))
        .all(conn)
        .await?;

    let total: Decimal = items
        .iter()
        .map(|item| Decimal::from(item.quantity) * item.unit_price)
        .sum();
    let total = total.round_dp(2);

    let mut active: OrderActive = order.into();
    active.total = Set(total);
    active.update(conn).await?;

    Ok(total)
}

fn validate_description(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Description is required".into()));
    }
    Ok(trimmed.to_string())
}

fn validate_quantity(quantity: i32) -> AppResult<i32> {
    if quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }
    Ok(quantity)
}

fn validate_unit_price(unit_price: Decimal) -> AppResult<Decimal> {
    if unit_price < Decimal::ZERO {
        return Err(AppError::BadRequest("Unit price cannot be negative".into()));
    }
    Ok(unit_price.round_dp(2))
}

pub(crate) fn line_item_from_entity(model: ItemModel) -> LineItem {
    LineItem {
        id: model.id,
        order_id: model.order_id,
        description: model.description,
        quantity: model.quantity,
        unit_price: model.unit_price,
    }
}
