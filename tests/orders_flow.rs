use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, Statement};

use workshop_orders_api::{
    db::{create_orm_conn, run_migrations},
    dto::{
        clients::QuickCreateRequest,
        line_items::{CreateLineItemRequest, UpdateLineItemRequest},
        orders::{CreateOrderRequest, UpdateOrderRequest},
    },
    entity::{
        clients::ActiveModel as ClientActive,
        equipment::ActiveModel as EquipmentActive,
        line_items::{Column as ItemCol, Entity as LineItems},
        service_orders::Entity as ServiceOrders,
    },
    error::AppError,
    models::{EquipmentKind, OrderStatus},
    routes::params::{DashboardQuery, EquipmentOptionsQuery},
    services::{client_service, equipment_service, line_item_service, order_service},
    state::AppState,
};

// Integration flow: create an order, work its line items, check the stored
// total after every mutation, then the dashboard, quick-create and cascades.
// Skipped when no database is configured in the environment.
//
// Each test truncates the tables, so they take a shared lock to keep the
// default parallel test runner from interleaving them.
static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

macro_rules! state_or_skip {
    () => {
        match test_state().await {
            Some(state) => state,
            None => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        }
    };
}

#[tokio::test]
async fn order_total_follows_line_items() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = state_or_skip!();

    let (client_id, equipment_id) = seed_client_with_equipment(&state, "Ana Silva", "111").await?;

    let created = order_service::create_order(
        &state,
        CreateOrderRequest {
            client_id,
            equipment_id,
            reported_defect: "Does not power on".into(),
        },
    )
    .await?;
    let order = created.data.unwrap().order;

    // Defaults regardless of payload shape: open and 0.00.
    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(order.total, Decimal::ZERO);

    let first = line_item_service::add_item(
        &state,
        order.id,
        CreateLineItemRequest {
            description: "Power supply".into(),
            quantity: Some(2),
            unit_price: Decimal::new(7500, 2), // 75.00
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(stored_total(&state, order.id).await?, Decimal::new(15000, 2));

    let second = line_item_service::add_item(
        &state,
        order.id,
        CreateLineItemRequest {
            description: "Labor".into(),
            quantity: None, // defaults to 1
            unit_price: Decimal::new(5000, 2),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(second.quantity, 1);
    assert_eq!(stored_total(&state, order.id).await?, Decimal::new(20000, 2));

    line_item_service::update_item(
        &state,
        first.id,
        UpdateLineItemRequest {
            description: None,
            quantity: Some(1),
            unit_price: None,
        },
    )
    .await?;
    assert_eq!(stored_total(&state, order.id).await?, Decimal::new(12500, 2));

    line_item_service::remove_item(&state, first.id).await?;
    assert_eq!(stored_total(&state, order.id).await?, Decimal::new(5000, 2));

    // Deleting the last item drives the total back to exactly 0.00.
    line_item_service::remove_item(&state, second.id).await?;
    assert_eq!(stored_total(&state, order.id).await?, Decimal::ZERO);

    Ok(())
}

#[tokio::test]
async fn concurrent_item_inserts_keep_total_consistent() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = state_or_skip!();

    let (client_id, equipment_id) = seed_client_with_equipment(&state, "Bruno", "222").await?;
    let order = order_service::create_order(
        &state,
        CreateOrderRequest {
            client_id,
            equipment_id,
            reported_defect: "Noisy fan".into(),
        },
    )
    .await?
    .data
    .unwrap()
    .order;

    let state_a = state.clone();
    let state_b = state.clone();
    let order_id = order.id;

    let (a, b) = tokio::join!(
        tokio::spawn(async move {
            line_item_service::add_item(
                &state_a,
                order_id,
                CreateLineItemRequest {
                    description: "Fan".into(),
                    quantity: Some(1),
                    unit_price: Decimal::new(3000, 2),
                },
            )
            .await
        }),
        tokio::spawn(async move {
            line_item_service::add_item(
                &state_b,
                order_id,
                CreateLineItemRequest {
                    description: "Thermal paste".into(),
                    quantity: Some(1),
                    unit_price: Decimal::new(1000, 2),
                },
            )
            .await
        }),
    );
    a??;
    b??;

    let items = LineItems::find()
        .filter(ItemCol::OrderId.eq(order_id))
        .all(&state.orm)
        .await?;
    assert_eq!(items.len(), 2, "both concurrent inserts must persist");
    assert_eq!(stored_total(&state, order_id).await?, Decimal::new(4000, 2));

    Ok(())
}

#[tokio::test]
async fn dashboard_search_matches_id_and_client_name() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = state_or_skip!();

    let (ana_id, ana_equip) = seed_client_with_equipment(&state, "Ana Silva", "333").await?;
    let (bruno_id, bruno_equip) = seed_client_with_equipment(&state, "Bruno", "444").await?;

    let mut order_ids = Vec::new();
    for (client_id, equipment_id) in [
        (ana_id, ana_equip),
        (bruno_id, bruno_equip),
        (ana_id, ana_equip),
        (bruno_id, bruno_equip),
        (ana_id, ana_equip),
        (bruno_id, bruno_equip),
        (ana_id, ana_equip),
    ] {
        let order = order_service::create_order(
            &state,
            CreateOrderRequest {
                client_id,
                equipment_id,
                reported_defect: "Broken".into(),
            },
        )
        .await?
        .data
        .unwrap()
        .order;
        order_ids.push(order.id);
    }

    // Empty search: at most the five most recent, newest first.
    let recent = order_service::dashboard(&state, DashboardQuery { q: None })
        .await?
        .data
        .unwrap();
    assert_eq!(recent.orders.len(), 5);
    let entered: Vec<_> = recent.orders.iter().map(|o| o.entered_at).collect();
    let mut sorted = entered.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(entered, sorted, "expected newest-first ordering");
    assert_eq!(recent.open_count, 7);

    // Case-insensitive client-name match.
    let by_name = order_service::dashboard(
        &state,
        DashboardQuery {
            q: Some("ana".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!by_name.orders.is_empty());
    assert!(by_name.orders.iter().all(|o| o.client_name == "Ana Silva"));

    // Substring-of-id match.
    let probe = order_ids[0].to_string();
    let by_id = order_service::dashboard(
        &state,
        DashboardQuery {
            q: Some(probe.clone()),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(
        by_id
            .orders
            .iter()
            .any(|o| o.id.to_string().contains(&probe)),
        "expected at least the probed order id to match"
    );

    Ok(())
}

#[tokio::test]
async fn equipment_lookup_is_scoped_to_the_client() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = state_or_skip!();

    let (ana_id, ana_equip) = seed_client_with_equipment(&state, "Ana Silva", "555").await?;
    let (_bruno_id, bruno_equip) = seed_client_with_equipment(&state, "Bruno", "666").await?;

    let options = equipment_service::options_for_client(
        &state,
        EquipmentOptionsQuery {
            client: Some(ana_id.to_string()),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(options.items.iter().any(|e| e.id == ana_equip));
    assert!(options.items.iter().all(|e| e.id != bruno_equip));

    // Missing, malformed and unknown ids yield an empty list, never an error.
    for raw in [None, Some("not-a-number".to_string()), Some("999999".to_string())] {
        let options =
            equipment_service::options_for_client(&state, EquipmentOptionsQuery { client: raw })
                .await?
                .data
                .unwrap();
        assert!(options.items.is_empty());
    }

    Ok(())
}

#[tokio::test]
async fn quick_create_is_atomic() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = state_or_skip!();

    let option = client_service::quick_create(
        &state,
        QuickCreateRequest {
            name: Some("João".into()),
            tax_id: None,
            phone: None,
            brand: Some("Dell".into()),
            model: Some("XPS".into()),
            serial: Some("SN1".into()),
        },
    )
    .await?;
    assert!(option.selected);
    assert_eq!(option.label, "João");

    let equipment = equipment_service::options_for_client(
        &state,
        EquipmentOptionsQuery {
            client: Some(option.value.to_string()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(equipment.items.len(), 1);
    assert_eq!(equipment.items[0].brand, "Dell");
    assert_eq!(equipment.items[0].kind, EquipmentKind::Other);

    // Missing brand: neither row is created.
    let clients_before = count_rows(&state, "clients").await?;
    let equipment_before = count_rows(&state, "equipment").await?;
    let err = client_service::quick_create(
        &state,
        QuickCreateRequest {
            name: Some("Maria".into()),
            tax_id: None,
            phone: None,
            brand: None,
            model: Some("XPS".into()),
            serial: Some("SN2".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(count_rows(&state, "clients").await?, clients_before);
    assert_eq!(count_rows(&state, "equipment").await?, equipment_before);

    Ok(())
}

#[tokio::test]
async fn deleting_a_client_cascades_to_orders_and_items() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = state_or_skip!();

    let (client_id, equipment_id) = seed_client_with_equipment(&state, "Carla", "777").await?;
    let order = order_service::create_order(
        &state,
        CreateOrderRequest {
            client_id,
            equipment_id,
            reported_defect: "Dead pixels".into(),
        },
    )
    .await?
    .data
    .unwrap()
    .order;
    line_item_service::add_item(
        &state,
        order.id,
        CreateLineItemRequest {
            description: "Panel".into(),
            quantity: Some(1),
            unit_price: Decimal::new(40000, 2),
        },
    )
    .await?;

    client_service::delete_client(&state, client_id).await?;

    assert!(ServiceOrders::find_by_id(order.id).one(&state.orm).await?.is_none());
    let orphans = LineItems::find()
        .filter(ItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?;
    assert!(orphans.is_empty(), "line items must not survive the cascade");

    Ok(())
}

#[tokio::test]
async fn update_rejects_foreign_equipment_and_unknown_status() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = state_or_skip!();

    let (ana_id, ana_equip) = seed_client_with_equipment(&state, "Ana Silva", "888").await?;
    let (_bruno_id, bruno_equip) = seed_client_with_equipment(&state, "Bruno", "999").await?;

    let order = order_service::create_order(
        &state,
        CreateOrderRequest {
            client_id: ana_id,
            equipment_id: ana_equip,
            reported_defect: "Overheating".into(),
        },
    )
    .await?
    .data
    .unwrap()
    .order;

    let err = order_service::update_order(
        &state,
        order.id,
        UpdateOrderRequest {
            client_id: None,
            equipment_id: Some(bruno_equip),
            reported_defect: None,
            technical_report: None,
            status: None,
            exited_at: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::update_order(
        &state,
        order.id,
        UpdateOrderRequest {
            client_id: None,
            equipment_id: None,
            reported_defect: None,
            technical_report: None,
            status: Some("shipped".into()),
            exited_at: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Any known status is accepted, including jumps; transitions are free.
    let updated = order_service::update_order(
        &state,
        order.id,
        UpdateOrderRequest {
            client_id: None,
            equipment_id: None,
            reported_defect: None,
            technical_report: Some("Clogged heatsink".into()),
            status: Some("delivered".into()),
            exited_at: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.order.status, OrderStatus::Delivered);

    Ok(())
}

async fn test_state() -> Option<AppState> {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()?;

    let orm = create_orm_conn(&database_url).await.ok()?;
    run_migrations(&orm).await.ok()?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE line_items, service_orders, equipment, clients RESTART IDENTITY CASCADE",
    ))
    .await
    .ok()?;

    Some(AppState { orm })
}

async fn seed_client_with_equipment(
    state: &AppState,
    name: &str,
    tax_id: &str,
) -> anyhow::Result<(i64, i64)> {
    let client = ClientActive {
        id: NotSet,
        name: Set(name.to_string()),
        tax_id: Set(Some(tax_id.to_string())),
        phone: Set(Some("555-0100".to_string())),
        email: Set(None),
        address: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let equipment = EquipmentActive {
        id: NotSet,
        client_id: Set(client.id),
        kind: Set(EquipmentKind::Notebook.as_str().to_string()),
        brand: Set("Dell".to_string()),
        model: Set("XPS".to_string()),
        serial_number: Set(Some("SN-seed".to_string())),
    }
    .insert(&state.orm)
    .await?;

    Ok((client.id, equipment.id))
}

async fn stored_total(state: &AppState, order_id: i64) -> anyhow::Result<Decimal> {
    let order = ServiceOrders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .expect("order must exist");
    Ok(order.total)
}

async fn count_rows(state: &AppState, table: &str) -> anyhow::Result<i64> {
    let backend = state.orm.get_database_backend();
    let row = state
        .orm
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*)::bigint AS n FROM {table}"),
        ))
        .await?
        .expect("count row");
    Ok(row.try_get::<i64>("", "n")?)
}
