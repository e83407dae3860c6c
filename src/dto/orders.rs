use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Client, Equipment, LineItem, OrderStatus, ServiceOrder};

/// Creation payload. Status and total are intentionally absent: new orders
/// always start as `open` with a 0.00 total.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub client_id: i64,
    pub equipment_id: i64,
    pub reported_defect: String,
}

/// Edit payload. Absent fields keep their stored value. The total is never
/// accepted here; it is owned by the line-item recomputation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub client_id: Option<i64>,
    pub equipment_id: Option<i64>,
    pub reported_defect: Option<String>,
    pub technical_report: Option<String>,
    pub status: Option<String>,
    pub exited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: ServiceOrder,
    pub client: Client,
    pub equipment: Equipment,
    pub items: Vec<LineItem>,
}

/// Row shape for the dashboard order list.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummary {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub equipment_label: String,
    pub status: OrderStatus,
    pub status_label: String,
    pub total: Decimal,
    pub entered_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardData {
    pub open_count: i64,
    pub in_analysis_count: i64,
    pub ready_for_pickup_count: i64,
    pub orders: Vec<OrderSummary>,
    pub query: Option<String>,
}
