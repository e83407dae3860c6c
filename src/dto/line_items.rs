use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::LineItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLineItemRequest {
    pub description: String,
    /// Defaults to 1 when omitted.
    pub quantity: Option<i32>,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLineItemRequest {
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemList {
    pub items: Vec<LineItem>,
}
