pub mod clients;
pub mod equipment;
pub mod line_items;
pub mod service_orders;

pub use clients::Entity as Clients;
pub use equipment::Entity as Equipment;
pub use line_items::Entity as LineItems;
pub use service_orders::Entity as ServiceOrders;
