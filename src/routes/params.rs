use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DashboardQuery {
    /// Free-text search over order ids and client names.
    pub q: Option<String>,
}

/// Raw string on purpose: a malformed client id must mean "empty list",
/// not a query rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EquipmentOptionsQuery {
    pub client: Option<String>,
}
