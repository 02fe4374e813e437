use std::{sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pflix_api::{
    api::{create_router, AppState},
    auth::JwtConfig,
    config::{Config, StorageBackend},
    db::{
        create_pool, create_redis_client, run_migrations, seed_demo_data, Cache,
        CacheWriterHandle, InteractionStore, MemoryStore, PgInteractionStore, PgUserStore,
        UserStore,
    },
    services::catalog::{CachedCatalog, CatalogProvider, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pflix_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(host = %config.host, port = config.port, "Loaded configuration");

    let (interactions, users) = build_stores(&config).await?;

    if config.seed_demo {
        seed_demo_data(users.as_ref(), interactions.as_ref()).await?;
    }

    let tmdb = TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
        Duration::from_secs(config.catalog_timeout_secs),
    )?;
    if !tmdb.has_api_key() {
        tracing::warn!("TMDB_API_KEY is not set; every catalog request will fail with 503");
    }

    let (catalog, cache_handle) = build_catalog(tmdb, config.redis_url.as_deref())?;
    tracing::info!(provider = catalog.name(), "Catalog provider ready");

    let state = AppState::new(
        interactions,
        users,
        catalog,
        JwtConfig::from(&config),
    );

    let app = create_router(state, &config.cors_origin);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Connects and migrates PostgreSQL, or builds the in-memory store
async fn build_stores(
    config: &Config,
) -> anyhow::Result<(Arc<dyn InteractionStore>, Arc<dyn UserStore>)> {
    match config.storage {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            run_migrations(&pool).await?;
            tracing::info!("Database ready");
            Ok((
                Arc::new(PgInteractionStore::new(pool.clone())),
                Arc::new(PgUserStore::new(pool)),
            ))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let store = MemoryStore::new();
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
    }
}

/// Wraps the provider in the Redis cache when a URL is configured
fn build_catalog(
    tmdb: TmdbProvider,
    redis_url: Option<&str>,
) -> anyhow::Result<(Arc<dyn CatalogProvider>, Option<CacheWriterHandle>)> {
    let tmdb: Arc<dyn CatalogProvider> = Arc::new(tmdb);

    match redis_url.filter(|url| !url.is_empty()) {
        Some(url) => {
            let (cache, handle) = Cache::new(create_redis_client(url)?);
            tracing::info!("Catalog responses will be cached in Redis");
            Ok((Arc::new(CachedCatalog::new(tmdb, cache)), Some(handle)))
        }
        None => {
            tracing::info!("REDIS_URL not set, catalog caching disabled");
            Ok((tmdb, None))
        }
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
