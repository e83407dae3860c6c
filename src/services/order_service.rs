use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Alias, Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    dto::orders::{
        CreateOrderRequest, DashboardData, OrderSummary, OrderWithItems, UpdateOrderRequest,
    },
    entity::{
        clients::{Column as ClientCol, Entity as Clients},
        equipment::{Column as EquipCol, Entity as EquipmentEnt, Model as EquipmentModel},
        line_items::{Column as ItemCol, Entity as LineItems},
        service_orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as ServiceOrders,
            Model as OrderModel,
        },
    },
    error::{AppError, AppResult},
    models::{OrderStatus, ServiceOrder},
    response::{ApiResponse, Meta},
    routes::params::DashboardQuery,
    services::{
        client_service::client_from_entity,
        document,
        equipment_service::equipment_from_entity,
        line_item_service::line_item_from_entity,
    },
    state::AppState,
};

/// Number of orders shown on the dashboard when no search term is given.
const RECENT_ORDERS_LIMIT: u64 = 5;

pub async fn dashboard(
    state: &AppState,
    query: DashboardQuery,
) -> AppResult<ApiResponse<DashboardData>> {
    let open_count = count_by_status(&state.orm, OrderStatus::Open).await?;
    let in_analysis_count = count_by_status(&state.orm, OrderStatus::InAnalysis).await?;
    let ready_for_pickup_count = count_by_status(&state.orm, OrderStatus::ReadyForPickup).await?;

    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let orders = search_orders(&state.orm, term.as_deref()).await?;

    let data = DashboardData {
        open_count,
        in_analysis_count,
        ready_for_pickup_count,
        orders,
        query: term,
    };
    Ok(ApiResponse::success("Dashboard", data, Some(Meta::empty())))
}

async fn count_by_status<C: ConnectionTrait>(conn: &C, status: OrderStatus) -> AppResult<i64> {
    let count = ServiceOrders::find()
        .filter(OrderCol::Status.eq(status.as_str()))
        .count(conn)
        .await? as i64;
    Ok(count)
}

/// With a term: orders whose id (decimal string form) contains the term, or
/// whose client name contains it case-insensitively, newest first. Without a
/// term: the five most recent orders.
async fn search_orders<C: ConnectionTrait>(
    conn: &C,
    term: Option<&str>,
) -> AppResult<Vec<OrderSummary>> {
    let mut finder = ServiceOrders::find().find_also_related(Clients);

    if let Some(term) = term {
        let pattern = format!("%{term}%");
        finder = finder.filter(
            Condition::any()
                .add(
                    Expr::col((ServiceOrders, OrderCol::Id))
                        .cast_as(Alias::new("TEXT"))
                        .like(pattern.clone()),
                )
                .add(Expr::col((Clients, ClientCol::Name)).ilike(pattern)),
        );
    }

    finder = finder.order_by_desc(OrderCol::EnteredAt);
    if term.is_none() {
        finder = finder.limit(RECENT_ORDERS_LIMIT);
    }

    let rows = finder.all(conn).await?;

    let equipment_ids: Vec<i64> = rows.iter().map(|(order, _)| order.equipment_id).collect();
    let labels: HashMap<i64, String> = EquipmentEnt::find()
        .filter(EquipCol::Id.is_in(equipment_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|model| (model.id, equipment_from_entity(model).display_label()))
        .collect();

    let summaries = rows
        .into_iter()
        .map(|(order, client)| {
            let status = OrderStatus::parse(&order.status).unwrap_or_default();
            OrderSummary {
                id: order.id,
                client_id: order.client_id,
                client_name: client.map(|c| c.name).unwrap_or_default(),
                equipment_label: labels.get(&order.equipment_id).cloned().unwrap_or_default(),
                status,
                status_label: status.label().to_string(),
                total: order.total,
                entered_at: order.entered_at.with_timezone(&Utc),
            }
        })
        .collect();

    Ok(summaries)
}

pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.reported_defect.trim().is_empty() {
        return Err(AppError::BadRequest("Reported defect is required".into()));
    }

    let txn = state.orm.begin().await?;

    let client = Clients::find_by_id(payload.client_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown client".into()))?;
    let equipment = ensure_client_equipment(&txn, payload.client_id, payload.equipment_id).await?;

    // Status and total are not caller inputs; every new order opens at 0.00.
    let order = OrderActive {
        id: NotSet,
        client_id: Set(client.id),
        equipment_id: Set(equipment.id),
        reported_defect: Set(payload.reported_defect),
        technical_report: Set(None),
        status: Set(OrderStatus::Open.as_str().to_string()),
        total: Set(Decimal::ZERO),
        entered_at: NotSet,
        exited_at: Set(None),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order_from_entity(order),
            client: client_from_entity(client),
            equipment: equipment_from_entity(equipment),
            items: Vec::new(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(state: &AppState, id: i64) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = ServiceOrders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let bundle = load_order_bundle(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", bundle, Some(Meta::empty())))
}

pub async fn update_order(
    state: &AppState,
    id: i64,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let existing = ServiceOrders::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let client_id = payload.client_id.unwrap_or(existing.client_id);
    let equipment_id = payload.equipment_id.unwrap_or(existing.equipment_id);
    Clients::find_by_id(client_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown client".into()))?;
    ensure_client_equipment(&txn, client_id, equipment_id).await?;

    // Any status may replace any other; staff overrides are allowed.
    let status = match payload.status.as_deref() {
        Some(raw) => OrderStatus::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{raw}'")))?,
        None => OrderStatus::parse(&existing.status).unwrap_or_default(),
    };

    if let Some(defect) = payload.reported_defect.as_deref()
        && defect.trim().is_empty()
    {
        return Err(AppError::BadRequest("Reported defect is required".into()));
    }

    let mut active: OrderActive = existing.clone().into();
    active.client_id = Set(client_id);
    active.equipment_id = Set(equipment_id);
    active.reported_defect = Set(payload
        .reported_defect
        .unwrap_or(existing.reported_defect));
    active.technical_report = Set(payload
        .technical_report
        .or(existing.technical_report));
    active.status = Set(status.as_str().to_string());
    active.exited_at = Set(payload
        .exited_at
        .map(Into::into)
        .or(existing.exited_at));
    let order = active.update(&txn).await?;

    let bundle = load_order_bundle(&txn, order).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Order updated", bundle, Some(Meta::empty())))
}

/// Load a service order's client, equipment and line items and render the
/// printable document. Rendering runs on a blocking thread; any compile
/// failure comes back as a generic server error with no bytes produced.
pub async fn export_document(state: &AppState, id: i64) -> AppResult<Vec<u8>> {
    let order = ServiceOrders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let bundle = load_order_bundle(&state.orm, order).await?;

    let bytes = tokio::task::spawn_blocking(move || document::render_order(&bundle))
        .await
        .map_err(|err| AppError::Internal(err.into()))??;

    Ok(bytes)
}

async fn load_order_bundle<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<OrderWithItems> {
    let client = Clients::find_by_id(order.client_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    let equipment = EquipmentEnt::find_by_id(order.equipment_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    let items = LineItems::find()
        .filter(ItemCol::OrderId.eq(order.id))
        .order_by_asc(ItemCol::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(line_item_from_entity)
        .collect();

    Ok(OrderWithItems {
        order: order_from_entity(order),
        client: client_from_entity(client),
        equipment: equipment_from_entity(equipment),
        items,
    })
}

async fn ensure_client_equipment<C: ConnectionTrait>(
    conn: &C,
    client_id: i64,
    equipment_id: i64,
) -> AppResult<EquipmentModel> {
    let equipment = EquipmentEnt::find_by_id(equipment_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown equipment".into()))?;

    // Equipment choices are always scoped to the selected client.
    if equipment.client_id != client_id {
        return Err(AppError::BadRequest(
            "Equipment does not belong to the selected client".into(),
        ));
    }

    Ok(equipment)
}

pub(crate) fn order_from_entity(model: OrderModel) -> ServiceOrder {
    ServiceOrder {
        id: model.id,
        client_id: model.client_id,
        equipment_id: model.equipment_id,
        reported_defect: model.reported_defect,
        technical_report: model.technical_report,
        // Writes only store known keys, so parse cannot miss here.
        status: OrderStatus::parse(&model.status).unwrap_or_default(),
        total: model.total,
        entered_at: model.entered_at.with_timezone(&Utc),
        exited_at: model.exited_at.map(|dt| dt.with_timezone(&Utc)),
    }
}
