use std::sync::Arc;
use std::time::Duration;
use supernova_orders::api::{ApiServer, AppState, HttpSource};
use supernova_orders::config::CoordinatorConfig;
use supernova_orders::lifecycle::OrderSystem;
use supernova_orders::model::{
    AssignmentCreate, CustomerInfo, DeliveryType, GeoPoint, ItemId, NormalizedStatus, OrderCreate,
    OrderItem, OrderStatus,
};
use supernova_orders::order_actor::OrderError;
use supernova_orders::polling::{
    DetailState, OrderDetailView, PollConfig, SourceError, StatusSubmitter, SubmitError,
    TrackingSource, TrackingView,
};

fn burger(quantity: u32) -> OrderItem {
    OrderItem {
        id: ItemId::Number(1),
        name: "Supernova Burger".to_string(),
        price: 129.0,
        quantity,
        unit: None,
    }
}

fn customer(delivery_type: DeliveryType) -> CustomerInfo {
    CustomerInfo {
        name: "Ana".to_string(),
        phone: "5512345678".to_string(),
        delivery_type,
        address: Some("Av. Reforma 100".to_string()),
        pickup_time: None,
        notes: None,
        source: None,
    }
}

fn delivery_order() -> OrderCreate {
    OrderCreate::new(&[burger(2)], 35.0, Some(&customer(DeliveryType::Delivery))).unwrap()
}

/// Full end-to-end integration test with all real actors.
/// An admin moves a new order to `preparando` and the next read shows it.
#[tokio::test]
async fn test_status_change_is_visible_on_next_read() {
    let system = OrderSystem::new();

    let order_id = system
        .order_client
        .create_order(delivery_order())
        .await
        .expect("Failed to create order");

    let order = system.order_client.get_order(order_id).await.unwrap();
    assert_eq!(order.status, NormalizedStatus::Canonical(OrderStatus::Pendiente));
    assert_eq!(order.total, 293.0);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.version, 1);

    let updated = system
        .order_client
        .set_status(order_id, "preparando", Some(1))
        .await
        .expect("Failed to set status");
    assert_eq!(updated.status.canonical(), Some(OrderStatus::Preparando));
    assert!(updated.updated_at >= order.updated_at);

    let reread = system.order_client.get_order(order_id).await.unwrap();
    assert_eq!(reread.status.as_str(), "preparando");
    assert_eq!(reread.version, 2);

    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_rejected_writes_leave_the_order_untouched() {
    let system = OrderSystem::new();
    let order_id = system
        .order_client
        .create_order(delivery_order())
        .await
        .unwrap();

    system
        .order_client
        .set_status(order_id, "entregado", None)
        .await
        .unwrap();

    let err = system
        .order_client
        .set_status(order_id, "pendiente", None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        OrderError::IllegalTransition {
            from: OrderStatus::Entregado,
            to: OrderStatus::Pendiente,
        }
    );

    let err = system
        .order_client
        .set_status(order_id, "   ", None)
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::EmptyStatus);

    let err = system
        .order_client
        .set_status(order_id, "teleported", None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::UnknownStatus(_)));

    let order = system.order_client.get_order(order_id).await.unwrap();
    assert_eq!(order.status.canonical(), Some(OrderStatus::Entregado));
    assert_eq!(order.version, 2);

    system.shutdown().await.unwrap();
}

/// Two admins read version 1; the second writer is told the row moved on.
#[tokio::test]
async fn test_concurrent_admins_conflict_on_version() {
    let system = OrderSystem::new();
    let order_id = system
        .order_client
        .create_order(delivery_order())
        .await
        .unwrap();

    let first = system.order_client.clone();
    let second = system.order_client.clone();
    let (a, b) = tokio::join!(
        first.set_status(order_id, "preparando", Some(1)),
        second.set_status(order_id, "cancelado", Some(1)),
    );

    let outcomes = [a, b];
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(OrderError::VersionConflict { expected: 1, actual: 2 })))
        .count();
    assert_eq!(conflicts, 1);
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);

    let order = system.order_client.get_order(order_id).await.unwrap();
    assert_eq!(order.version, 2);

    drop(first);
    drop(second);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_legacy_rows_read_leniently() {
    let system = OrderSystem::new();
    let order_id = system
        .order_client
        .create_order(
            OrderCreate::raw("not json", 50.0)
                .with_status("  On_The_Way ")
                .with_customer_info("{broken"),
        )
        .await
        .unwrap();
    let legacy_id = system
        .order_client
        .create_order(OrderCreate::raw("[]", 0.0).with_status("Awaiting Payment"))
        .await
        .unwrap();

    let order = system.order_client.get_order(order_id).await.unwrap();
    assert!(order.items.is_empty());
    assert!(order.customer_info.is_none());
    assert_eq!(order.status.canonical(), Some(OrderStatus::EnCamino));

    let legacy = system.order_client.get_order(legacy_id).await.unwrap();
    assert_eq!(
        legacy.status,
        NormalizedStatus::Unrecognized("awaiting payment".to_string())
    );

    // an unrecognized stored status can still be moved to a canonical one
    let moved = system
        .order_client
        .set_status(legacy_id, "preparando", None)
        .await
        .unwrap();
    assert_eq!(moved.status.canonical(), Some(OrderStatus::Preparando));

    system.shutdown().await.unwrap();
}

/// A pending assignment has no location; once accepted the last report is returned.
#[tokio::test]
async fn test_driver_location_only_after_acceptance() {
    let system = OrderSystem::new();
    let order_id = system
        .order_client
        .create_order(delivery_order())
        .await
        .unwrap();
    let assignment_id = system
        .delivery_client
        .assign(AssignmentCreate::new(order_id, "Luis", "5587654321"))
        .await
        .unwrap();
    system
        .delivery_client
        .report_location(assignment_id, GeoPoint { lat: 19.4326, lng: -99.1332 })
        .await
        .unwrap();

    assert!(system
        .delivery_client
        .driver_location(order_id)
        .await
        .unwrap()
        .is_none());

    system.delivery_client.accept(assignment_id).await.unwrap();

    let location = system
        .delivery_client
        .driver_location(order_id)
        .await
        .unwrap()
        .expect("accepted assignment should expose its location");
    assert_eq!(location.lat, 19.4326);
    assert_eq!(location.lng, -99.1332);
    assert_eq!(location.driver_phone, "5587654321");

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_pickup_orders_cannot_be_assigned() {
    let system = OrderSystem::new();
    let order_id = system
        .order_client
        .create_order(
            OrderCreate::new(&[burger(1)], 0.0, Some(&customer(DeliveryType::Pickup))).unwrap(),
        )
        .await
        .unwrap();

    assert!(system
        .delivery_client
        .assign(AssignmentCreate::new(order_id, "Luis", "1"))
        .await
        .is_err());
    assert!(system
        .delivery_client
        .active_assignment(order_id)
        .await
        .unwrap()
        .is_none());

    // pickup orders may skip the delivery stages
    system
        .order_client
        .set_status(order_id, "listo_para_recoger", None)
        .await
        .unwrap();
    let done = system
        .order_client
        .set_status(order_id, "entregado", None)
        .await
        .unwrap();
    assert_eq!(done.status.canonical(), Some(OrderStatus::Entregado));

    system.shutdown().await.unwrap();
}

/// The tracking page over the real actors starts the location loop when the driver
/// accepts and drops it when the delivery completes.
#[tokio::test(start_paused = true)]
async fn test_tracking_view_follows_the_driver() {
    let system = OrderSystem::new();
    let order_id = system
        .order_client
        .create_order(delivery_order())
        .await
        .unwrap();
    let assignment_id = system
        .delivery_client
        .assign(AssignmentCreate::new(order_id, "Luis", "1"))
        .await
        .unwrap();

    let view = TrackingView::spawn(Arc::new(system.source()), order_id, &PollConfig::default());
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(view.state().order.is_some());
    assert!(!view.is_tracking_location());

    system.delivery_client.accept(assignment_id).await.unwrap();
    system
        .delivery_client
        .report_location(assignment_id, GeoPoint { lat: 19.4, lng: -99.1 })
        .await
        .unwrap();
    view.refresh();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(view.is_tracking_location());
    assert!(view.state().driver_on_the_way());
    assert_eq!(view.state().location.map(|l| l.lat), Some(19.4));

    system.delivery_client.complete(assignment_id).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!view.is_tracking_location());
    assert!(view.state().location.is_none());

    view.stop().await;
    system.shutdown().await.unwrap();
}

/// Views and the submitter handed out by a configured system use its periods and
/// cooldown.
#[tokio::test(start_paused = true)]
async fn test_configured_system_drives_views_and_submitter() {
    let config = CoordinatorConfig::from_lookup(|name| match name {
        "SUPERNOVA_ORDER_POLL_SECS" => Some("1".to_string()),
        "SUPERNOVA_STATUS_COOLDOWN_MS" => Some("500".to_string()),
        _ => None,
    })
    .unwrap();
    let system = OrderSystem::from_config(&config);
    assert_eq!(system.poll_config().order_every, Duration::from_secs(1));

    let order_id = system
        .order_client
        .create_order(delivery_order())
        .await
        .unwrap();

    let detail = system.order_detail(order_id);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(matches!(detail.state(), DetailState::Ready(o) if o.version == 1));

    let submitter = system.status_submitter();
    submitter
        .submit(order_id, "preparando", Some(1))
        .await
        .unwrap();
    let remaining = submitter.cooldown_remaining().expect("cooldown should be running");
    assert!(remaining <= Duration::from_millis(500));
    assert!(matches!(
        submitter.submit(order_id, "listo", Some(2)).await,
        Err(SubmitError::CoolingDown { .. })
    ));

    // another writer's change shows up on the next 1s poll
    system
        .order_client
        .set_status(order_id, "listo", Some(2))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1010)).await;
    assert!(matches!(
        detail.state(),
        DetailState::Ready(o) if o.status.as_str() == "listo" && o.version == 3
    ));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(submitter.cooldown_remaining().is_none());

    detail.stop().await;
    drop(submitter);
    system.shutdown().await.unwrap();
}

async fn wait_for<F>(view: &OrderDetailView<HttpSource>, mut ready: F) -> DetailState
where
    F: FnMut(&DetailState) -> bool,
{
    let mut rx = view.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| ready(s)))
        .await
        .expect("timed out waiting for detail state")
        .expect("detail view closed");
    state.clone()
}

/// The same flow as the admin screen, through the HTTP contract.
#[tokio::test]
async fn test_admin_flow_over_http() {
    let system = OrderSystem::new();
    let order_id = system
        .order_client
        .create_order(delivery_order())
        .await
        .unwrap();

    let server = ApiServer::start(
        "127.0.0.1:0",
        AppState {
            orders: system.order_client.clone(),
            deliveries: system.delivery_client.clone(),
        },
    )
    .await
    .expect("Failed to start server");

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let source = Arc::new(HttpSource::with_client(client, server.base_url()));

    let config = PollConfig {
        order_every: Duration::from_millis(100),
        ..PollConfig::default()
    };
    let detail = OrderDetailView::spawn(source.clone(), order_id, &config);
    let state = wait_for(&detail, |s| matches!(s, DetailState::Ready(_))).await;
    let DetailState::Ready(shown) = state else {
        unreachable!()
    };
    assert_eq!(shown.version, 1);

    let submitter = StatusSubmitter::new(source.clone(), Duration::from_secs(2));
    let written = submitter
        .submit(order_id, "preparando", Some(shown.version))
        .await
        .expect("status submit failed");
    detail.show(written.clone());
    assert_eq!(detail.state(), DetailState::Ready(written));

    // a stale version is rejected by the store, not retried
    let err = source
        .update_status(order_id, "listo", Some(1))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Rejected(msg) if msg.contains("Version conflict")));

    let state = wait_for(&detail, |s| {
        matches!(s, DetailState::Ready(o) if o.status.as_str() == "preparando")
    })
    .await;
    assert!(matches!(state, DetailState::Ready(o) if o.version == 2));

    let missing = source
        .fetch_order(supernova_orders::model::OrderId(999))
        .await
        .unwrap_err();
    assert_eq!(missing, SourceError::NotFound);
    assert!(source.fetch_assignment(order_id).await.unwrap().is_none());
    assert!(source.fetch_driver_location(order_id).await.unwrap().is_none());

    detail.stop().await;
    drop(submitter);
    drop(source);
    server.stop().await;
    system.shutdown().await.unwrap();
}
