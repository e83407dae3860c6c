pub mod client_service;
pub mod document;
pub mod equipment_service;
pub mod line_item_service;
pub mod order_service;
