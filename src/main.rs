//! Coordinator binary: loads the config, starts the actors and serves the HTTP contract
//! until Ctrl-C.

use actor_framework::tracing::setup_tracing;
use supernova_orders::api::{serve, AppState};
use supernova_orders::config::CoordinatorConfig;
use supernova_orders::lifecycle::OrderSystem;
use supernova_orders::model::{
    AssignmentCreate, CustomerInfo, DeliveryType, GeoPoint, ItemId, OrderCreate, OrderId,
    OrderItem,
};
use supernova_orders::polling::{LocalSource, TrackingView};
use tokio::net::TcpListener;
use tracing::{error, info, Instrument};

/// A delivery order on its way with an accepted driver, so every endpoint has something
/// to show.
async fn seed_demo(system: &OrderSystem) -> Result<OrderId, String> {
    let items = [
        OrderItem {
            id: ItemId::Number(1),
            name: "Supernova Burger".to_string(),
            price: 129.0,
            quantity: 2,
            unit: None,
        },
        OrderItem {
            id: ItemId::Text("wings-12".to_string()),
            name: "Boneless Wings".to_string(),
            price: 159.0,
            quantity: 1,
            unit: Some("12 pz".to_string()),
        },
    ];
    let customer = CustomerInfo {
        name: "Ana".to_string(),
        phone: "5512345678".to_string(),
        delivery_type: DeliveryType::Delivery,
        address: Some("Av. Reforma 100".to_string()),
        pickup_time: None,
        notes: None,
        source: Some("web".to_string()),
    };
    let params = OrderCreate::new(&items, 35.0, Some(&customer))
        .map_err(|e| e.to_string())?
        .created_from("demo");

    let order_id = system
        .order_client
        .create_order(params)
        .await
        .map_err(|e| e.to_string())?;
    let assignment_id = system
        .delivery_client
        .assign(AssignmentCreate::new(order_id, "Luis", "5587654321"))
        .await
        .map_err(|e| e.to_string())?;
    system
        .delivery_client
        .accept(assignment_id)
        .await
        .map_err(|e| e.to_string())?;
    system
        .delivery_client
        .report_location(
            assignment_id,
            GeoPoint {
                lat: 19.4326,
                lng: -99.1332,
            },
        )
        .await
        .map_err(|e| e.to_string())?;

    let admin = system.status_submitter();
    let order = admin
        .submit(order_id, "en_camino", Some(1))
        .await
        .map_err(|e| e.to_string())?;

    info!(order_id = %order_id, assignment_id = %assignment_id, status = %order.status, "Demo order seeded");
    Ok(order_id)
}

/// Logs every change the tracking page of the demo order would show.
fn watch_demo(view: &TrackingView<LocalSource>, order_id: OrderId) {
    let mut changes = view.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let state = changes.borrow_and_update().clone();
            info!(
                order_id = %order_id,
                status = ?state.order.as_ref().map(|o| o.status.to_string()),
                driver_on_the_way = state.driver_on_the_way(),
                location = ?state.location.as_ref().map(|l| (l.lat, l.lng)),
                "Tracking page"
            );
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = CoordinatorConfig::from_env().map_err(|e| e.to_string())?;

    // Setup tracing once for the entire application
    setup_tracing(&config.log);

    info!(addr = %config.http_addr, "Starting order coordinator");

    let system = OrderSystem::from_config(&config);

    let demo_view = if config.seed_demo {
        let span = tracing::info_span!("seed_demo");
        let order_id = seed_demo(&system).instrument(span).await?;
        let view = system.tracking(order_id);
        watch_demo(&view, order_id);
        Some(view)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.http_addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", config.http_addr, e))?;

    let state = AppState {
        orders: system.order_client.clone(),
        deliveries: system.delivery_client.clone(),
    };
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
        info!("Ctrl-C received");
    };

    let served = serve(listener, state, shutdown).await;

    if let Some(view) = demo_view {
        view.stop().await;
    }

    // Shutdown system gracefully
    system.shutdown().await?;

    served.map_err(|e| format!("HTTP server error: {}", e))?;
    info!("Coordinator stopped");
    Ok(())
}
