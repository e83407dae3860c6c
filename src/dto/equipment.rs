use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Equipment;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEquipmentRequest {
    pub client_id: i64,
    pub kind: String,
    pub brand: String,
    pub model: String,
    pub serial_number: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentList {
    pub items: Vec<Equipment>,
}
