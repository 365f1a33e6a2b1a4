//! # wirehomed — Wirehome Core daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct the JSON-tree storage adapter
//! - Start the diagnostics ticker and the idle-subscription pruner
//! - Construct the message bus and the registries, reload persisted state
//! - Register system status gauges
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT) via the process-wide
//!   cancellation token
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tracing_subscriber::EnvFilter;

use wirehome_adapter_http_axum::state::AppState;
use wirehome_adapter_storage_json::JsonStorage;
use wirehome_app::diagnostics::DiagnosticsService;
use wirehome_app::message_bus::{MessageBus, MessageBusConfig, MESSAGES_PUBLISHED_COUNTER};
use wirehome_app::services::{
    ComponentGroupRegistry, ComponentRegistry, GlobalVariablesService, NotificationsService,
};
use wirehome_app::shutdown::SystemCancellationToken;
use wirehome_app::system_status::SystemStatusService;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration
    let config = Config::load()?;

    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    tracing::info!("configuration loaded");

    // Shutdown signal shared by every background loop
    let shutdown = SystemCancellationToken::new();

    // Storage
    let storage = JsonStorage::new(&config.storage.data_dir);
    tracing::info!(data_dir = %config.storage.data_dir, "storage ready");

    // Diagnostics
    let diagnostics = Arc::new(DiagnosticsService::new());
    let messages_published =
        diagnostics.register_operations_per_second_counter(MESSAGES_PUBLISHED_COUNTER);
    tokio::spawn(Arc::clone(&diagnostics).run_ticker(shutdown.clone()));

    // Message bus
    let message_bus = Arc::new(MessageBus::new(
        MessageBusConfig {
            history_capacity: config.message_bus.history_capacity,
            queue_capacity: config.message_bus.queue_capacity,
        },
        Arc::clone(&messages_published),
        shutdown.clone(),
    ));

    // Registries — reload persisted state before serving
    let component_registry = Arc::new(ComponentRegistry::new(
        storage.clone(),
        Arc::clone(&message_bus),
    ));
    component_registry.initialize()?;
    let component_group_registry = Arc::new(ComponentGroupRegistry::new(
        storage.clone(),
        Arc::clone(&message_bus),
    ));
    component_group_registry.initialize()?;
    tracing::info!(
        components = component_registry.get_component_uids().len(),
        component_groups = component_group_registry.get_component_group_uids().len(),
        "registries initialized"
    );

    // Facade-backing services
    let global_variables = Arc::new(GlobalVariablesService::new(Arc::clone(&message_bus)));
    let notifications = Arc::new(NotificationsService::new(Arc::clone(&message_bus)));

    // System status gauges
    let system_status = Arc::new(SystemStatusService::new());
    system_status.set("wirehome.version", env!("CARGO_PKG_VERSION"));
    let started_at = Instant::now();
    system_status.set_provider("wirehome.uptime_seconds", move || {
        json!(started_at.elapsed().as_secs())
    });
    {
        let registry = Arc::clone(&component_registry);
        system_status.set_provider("component_registry.count", move || {
            json!(registry.get_component_uids().len())
        });
    }
    {
        let registry = Arc::clone(&component_group_registry);
        system_status.set_provider("component_group_registry.count", move || {
            json!(registry.get_component_group_uids().len())
        });
    }
    {
        let bus = Arc::clone(&message_bus);
        system_status.set_provider("message_bus.subscriptions", move || {
            json!(bus.subscription_count())
        });
    }
    {
        let counter = Arc::clone(&messages_published);
        system_status.set_provider("message_bus.messages_published_per_second", move || {
            json!(counter.last_rate())
        });
    }

    // Idle long-poll subscriptions expire in the background
    {
        let bus = Arc::clone(&message_bus);
        let idle_timeout = Duration::from_secs(config.message_bus.idle_timeout_secs);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        bus.prune_idle_subscriptions(idle_timeout);
                    }
                    () = shutdown.cancelled() => return,
                }
            }
        });
    }

    // HTTP
    let state = AppState::new(
        message_bus,
        component_registry,
        component_group_registry,
        global_variables,
        notifications,
        system_status,
    );
    let app = wirehome_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(addr = %bind_addr, "wirehomed listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                shutdown_signal().await;
                shutdown.cancel();
            }
        })
        .await?;

    shutdown.cancel();
    tracing::info!("shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl-C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
