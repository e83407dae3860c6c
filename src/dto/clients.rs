use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Client;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    pub name: String,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Inline client+equipment creation submitted from the order form.
/// Everything is optional at the deserialization layer so that a missing
/// field surfaces as our own 400 with a message, not a body-rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuickCreateRequest {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
}

/// The selectable option handed back to the order form after quick-create,
/// pre-selected so the new client is immediately usable.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientOption {
    pub value: i64,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientList {
    pub items: Vec<Client>,
}
