use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a service order. The keys are stored as-is in the database;
/// the labels are what a staff-facing UI displays.
///
/// The nominal progression is open -> in_analysis -> awaiting_quote ->
/// authorized -> ready_for_pickup -> delivered, with cancelled reachable
/// from anywhere. Transitions are deliberately not enforced: the edit path
/// accepts any status so staff can override the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Open,
    InAnalysis,
    AwaitingQuote,
    Authorized,
    ReadyForPickup,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Open,
        OrderStatus::InAnalysis,
        OrderStatus::AwaitingQuote,
        OrderStatus::Authorized,
        OrderStatus::ReadyForPickup,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::InAnalysis => "in_analysis",
            OrderStatus::AwaitingQuote => "awaiting_quote",
            OrderStatus::Authorized => "authorized",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Open => "Open",
            OrderStatus::InAnalysis => "In Analysis",
            OrderStatus::AwaitingQuote => "Awaiting Quote",
            OrderStatus::Authorized => "Authorized",
            OrderStatus::ReadyForPickup => "Ready for Pickup",
            OrderStatus::Delivered => "Delivered/Finalized",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<OrderStatus> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

/// Category tag for a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Notebook,
    Desktop,
    Monitor,
    #[default]
    Other,
}

impl EquipmentKind {
    pub const ALL: [EquipmentKind; 4] = [
        EquipmentKind::Notebook,
        EquipmentKind::Desktop,
        EquipmentKind::Monitor,
        EquipmentKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentKind::Notebook => "notebook",
            EquipmentKind::Desktop => "desktop",
            EquipmentKind::Monitor => "monitor",
            EquipmentKind::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentKind::Notebook => "Notebook",
            EquipmentKind::Desktop => "Desktop",
            EquipmentKind::Monitor => "Monitor",
            EquipmentKind::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<EquipmentKind> {
        Self::ALL.iter().copied().find(|k| k.as_str() == value)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub id: i64,
    pub client_id: i64,
    pub kind: EquipmentKind,
    pub brand: String,
    pub model: String,
    pub serial_number: Option<String>,
}

impl Equipment {
    /// Display form used in order summaries and the exported document,
    /// e.g. "Notebook Dell XPS".
    pub fn display_label(&self) -> String {
        format!("{} {} {}", self.kind.label(), self.brand, self.model)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceOrder {
    pub id: i64,
    pub client_id: i64,
    pub equipment_id: i64,
    pub reported_defect: String,
    pub technical_report: Option<String>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_keys_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn default_status_is_open() {
        assert_eq!(OrderStatus::default(), OrderStatus::Open);
        assert_eq!(OrderStatus::default().as_str(), "open");
    }

    #[test]
    fn equipment_kind_parses_known_tags() {
        assert_eq!(EquipmentKind::parse("notebook"), Some(EquipmentKind::Notebook));
        assert_eq!(EquipmentKind::parse("tablet"), None);
        assert_eq!(EquipmentKind::default(), EquipmentKind::Other);
    }

    #[test]
    fn subtotal_is_quantity_times_unit_price() {
        let item = LineItem {
            id: 1,
            order_id: 1,
            description: "Screen replacement".into(),
            quantity: 3,
            unit_price: Decimal::new(1250, 2), // 12.50
        };
        assert_eq!(item.subtotal(), Decimal::new(3750, 2));
    }
}
