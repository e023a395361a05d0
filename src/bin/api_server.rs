// src/bin/api_server.rs

use anyhow::Context;
use entity_crud_service::infra::config::{Settings, StoreBackend};
use entity_crud_service::infra::logging;
use entity_crud_service::transport;
use entity_crud_service::{DocumentStore, EntityRegistry, InMemoryDocumentStore, PostgresDocumentStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("loading configuration")?;
    logging::init(settings.log_format);

    let registry = EntityRegistry::standard();
    tracing::info!(collections = ?registry.collections(), "entity registry initialized");

    // --- Document Store Initialization ---
    let store = open_store(&settings, &registry).await?;

    let app_state = transport::http::AppState::new(store, registry.clone(), &settings.app_name);

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);
    let mut app = transport::http::create_router(app_state);
    if settings.enable_swagger {
        app = app.merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::api_doc(&registry)),
        );
    }
    let app = app.layer(TraceLayer::new_for_http()).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    tracing::info!(addr = %settings.bind_addr, "API server listening");
    if settings.enable_swagger {
        tracing::info!("Swagger UI available at /swagger-ui");
    }

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}

async fn open_store(
    settings: &Settings,
    registry: &EntityRegistry,
) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match settings.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory document store; data is lost on exit");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let store = PostgresDocumentStore::connect(url, settings.db_max_connections).await?;
            store.ensure_collections(registry).await?;
            tracing::info!("document store connected");
            Ok(Arc::new(store))
        }
    }
}
