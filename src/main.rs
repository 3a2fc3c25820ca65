//! Atelier Commerce - Self-hosted Storefront Service

use anyhow::Result;
use atelier_commerce::bus::EventBus;
use atelier_commerce::checkout::OrderFlowEngine;
use atelier_commerce::config::AppConfig;
use atelier_commerce::gateway::razorpay::RazorpayGateway;
use atelier_commerce::http::{router, AppState};
use atelier_commerce::store::postgres::{PgAccounts, PgCatalog, PgOrders};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, events disabled");
                None
            }
        },
        None => None,
    };
    let bus = Arc::new(EventBus::new(nats, "commerce"));

    let catalog = Arc::new(PgCatalog::new(db.clone()));
    let accounts = Arc::new(PgAccounts::new(db.clone()));
    let orders = Arc::new(PgOrders::new(db.clone()));
    let gateway = Arc::new(RazorpayGateway::with_base_url(
        config.gateway.clone(),
        &config.gateway_base_url,
    ));
    let engine = Arc::new(OrderFlowEngine::new(
        catalog.clone(),
        accounts.clone(),
        orders,
        gateway,
        config.gateway.clone(),
        config.currency.clone(),
        bus,
    ));

    let state = AppState {
        engine,
        catalog,
        accounts,
        currency: config.currency.clone(),
        auth_secret: config.auth_secret.clone(),
    };
    let app = router(state);

    tracing::info!("atelier-commerce listening on 0.0.0.0:{}", config.port);
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?,
        app,
    )
    .await?;
    Ok(())
}
