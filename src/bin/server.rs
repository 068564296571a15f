//! Admin backend server: loads the entity catalog, ensures tables exist,
//! mounts common and API routes.

use axum::Router;
use brokerage_admin::{
    api_routes, common_routes_with_ready, discover_from_pool, ensure_database_exists,
    ensure_entity_tables, load_from_path, resolve_catalog, AppState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("brokerage_admin=info".parse()?),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/brokerage".into());
    ensure_database_exists(&database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    // Catalog from an explicit document when given, otherwise discovered
    // from the live schema.
    let catalog = match std::env::var("CATALOG_PATH") {
        Ok(path) => load_from_path(&path)?,
        Err(_) => {
            let config = discover_from_pool(&pool, "public").await?;
            resolve_catalog(&config)?
        }
    };
    tracing::info!(entities = catalog.len(), "catalog ready");
    ensure_entity_tables(&pool, &catalog).await?;

    let state = AppState {
        pool: pool.clone(),
        catalog: Arc::new(catalog),
    };

    let app = Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .nest("/api/v1", api_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(1024 * 1024)),
        );

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
