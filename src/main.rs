// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitness Advisor server
//!
//! Runs the recommendation pipeline (one worker per topic partition) next
//! to the HTTP API used to publish events and read recommendations.

use fitness_advisor::{
    config::{Config, StoreBackend},
    db::FirestoreDb,
    services::{AdvisorClient, ConsumptionPump, MemoryBus, RecommendationProcessor},
    AppState,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Fitness Advisor");

    let db = match config.store_backend {
        StoreBackend::Firestore => FirestoreDb::new(&config.gcp_project_id)
            .await
            .expect("Failed to connect to Firestore"),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory recommendation store; data is lost on restart");
            FirestoreDb::new_in_memory()
        }
    };

    let advisor = AdvisorClient::new(&config).expect("Failed to initialize advisor client");
    tracing::info!(
        timeout_secs = config.advisor_timeout_secs,
        "Advisor client initialized"
    );

    let bus = MemoryBus::new(&config.topic_name, config.bus_partitions);

    // Start the pipeline
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let processor = RecommendationProcessor::new(advisor, db.clone());
    let pump = ConsumptionPump::new(bus.clone(), &config.consumer_group, processor);
    let pump_task = tokio::spawn(async move { pump.run(shutdown_rx).await });

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        bus,
    });

    // Build router
    let app = fitness_advisor::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stopping consumption pump");
    let _ = shutdown_tx.send(true);
    pump_task.await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitness_advisor=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
