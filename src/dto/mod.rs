pub mod clients;
pub mod equipment;
pub mod line_items;
pub mod orders;
