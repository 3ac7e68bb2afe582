use std::sync::Arc;

use serde_json::json;

use brigade_core::domain::{Event, Scope};
use brigade_core::impls::InMemoryConnection;
use brigade_core::{Connection, DispatchHandler, ShiftBuilder};

/// A worker process: answers each relayed order on its own channel.
async fn worker_loop(name: &'static str, conn: InMemoryConnection) {
    while let Ok(order) = conn.receive().await {
        println!("[{name}] cooking: {order}");
        let result = json!({ "by": name, "served": order });
        if conn.send(result).await.is_err() {
            break;
        }
    }
}

/// Put one worker on duty and spawn its loop.
async fn hire(handler: &Arc<DispatchHandler>, name: &'static str, capabilities: &[&str]) {
    let (registry_end, worker_end) = InMemoryConnection::pair(8);
    handler
        .handle(Event::new(
            Scope::duty_start(name, capabilities),
            Arc::new(registry_end),
        ))
        .await
        .expect("duty-start event");
    tokio::spawn(worker_loop(name, worker_end));
}

/// Place one order and wait for the relayed result.
async fn order(
    handler: &Arc<DispatchHandler>,
    capability: &str,
    payload: serde_json::Value,
) -> serde_json::Value {
    let (handler_end, requester_end) = InMemoryConnection::pair(8);
    requester_end.send(payload).await.expect("send full order");
    handler
        .handle(Event::new(Scope::order(capability), Arc::new(handler_end)))
        .await
        .expect("order event");
    requester_end.receive().await.expect("receive result")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // (A) Open the shift: fresh registry + handler.
    let shift = ShiftBuilder::new().build();
    let handler = shift.handler();

    // (B) Staff come on duty, each with their stations.
    hire(&handler, "ayla", &["grill", "fry"]).await;
    hire(&handler, "benj", &["sushi"]).await;

    // (C) A qualified order: routed to the grill.
    let result = order(&handler, "grill", json!({ "item": "burger" })).await;
    println!("grill order -> {result}");

    // (D) No one does "pastry": routed to an arbitrary active worker.
    let result = order(&handler, "pastry", json!({ "item": "eclair" })).await;
    println!("pastry order -> {result}");

    // (E) Grill worker leaves; grill orders now land on whoever is left.
    let (end, _keep) = InMemoryConnection::pair(1);
    handler
        .handle(Event::new(Scope::duty_end("ayla"), Arc::new(end)))
        .await
        .expect("duty-end event");

    let result = order(&handler, "grill", json!({ "item": "steak" })).await;
    println!("grill order after ayla left -> {result}");

    let counts = shift.registry().counts().await;
    println!(
        "end of demo: {} active workers, {} capabilities indexed",
        counts.active_workers, counts.capabilities
    );
    // Shift drops here; nothing persists into the next one.
}
