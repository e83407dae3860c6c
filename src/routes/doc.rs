use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        clients::{ClientList, ClientOption, CreateClientRequest, QuickCreateRequest},
        equipment::{CreateEquipmentRequest, EquipmentList},
        line_items::{CreateLineItemRequest, LineItemList, UpdateLineItemRequest},
        orders::{CreateOrderRequest, DashboardData, OrderSummary, OrderWithItems, UpdateOrderRequest},
    },
    models::{Client, Equipment, EquipmentKind, LineItem, OrderStatus, ServiceOrder},
    response::{ApiResponse, Meta},
    routes::{clients, dashboard, equipment, health, line_items, orders, params},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        dashboard::dashboard,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::export_order_pdf,
        orders::list_items,
        orders::add_item,
        line_items::update_item,
        line_items::remove_item,
        equipment::equipment_options,
        equipment::create_equipment,
        equipment::delete_equipment,
        clients::list_clients,
        clients::get_client,
        clients::create_client,
        clients::delete_client,
        clients::quick_create,
    ),
    components(
        schemas(
            Client,
            Equipment,
            EquipmentKind,
            ServiceOrder,
            LineItem,
            OrderStatus,
            OrderSummary,
            OrderWithItems,
            DashboardData,
            CreateOrderRequest,
            UpdateOrderRequest,
            CreateLineItemRequest,
            UpdateLineItemRequest,
            LineItemList,
            CreateEquipmentRequest,
            EquipmentList,
            CreateClientRequest,
            QuickCreateRequest,
            ClientOption,
            ClientList,
            params::Pagination,
            params::DashboardQuery,
            params::EquipmentOptionsQuery,
            Meta,
            ApiResponse<DashboardData>,
            ApiResponse<OrderWithItems>,
            ApiResponse<LineItemList>,
            ApiResponse<EquipmentList>,
            ApiResponse<ClientList>,
            ApiResponse<ClientOption>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Dashboard", description = "Status metrics and order search"),
        (name = "Orders", description = "Service order endpoints"),
        (name = "Line Items", description = "Billable parts and labor against an order"),
        (name = "Equipment", description = "Client-scoped equipment endpoints"),
        (name = "Clients", description = "Client endpoints including quick-create"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
