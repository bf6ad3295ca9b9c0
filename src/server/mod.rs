//! HTTP surface of the build/proxy tier.
//!
//! # Routes
//!
//! - `POST /js` - resolve `{ "requires": [...] }` into a bundle (`application/json`)
//! - `POST|PUT /compile` - compile a `text/javascript` body through the compiler service
//! - `GET /docs/{file}` - proxied, rewritten documentation
//! - `GET /samples?selected=<id>` - public sample listing
//! - `POST /admin/cache/flush` - drop every cache entry (administrator bearer token)
//! - `GET /health` - liveness plus symbol table and cache statistics
//!
//! Every handler shares one [`AppState`]. The symbol table inside it is
//! immutable; the [`Cache`] is the only shared mutable state.

pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cache::Cache;
use crate::compiler::CompilerClient;
use crate::config::KitchenConfig;
use crate::docs::DocsProxy;
use crate::resolver::Resolver;
use crate::samples::SampleIndex;
use crate::store::{IdentityProvider, MemoryProjectStore, ProjectStore, TokenIdentity};
use crate::symbols::{SymbolTable, load_symbol_table};

pub use error::ApiError;
pub use routes::create_router;

/// Application state shared across handlers.
#[derive(Debug)]
pub struct AppState {
    pub resolver: Resolver,
    pub cache: Cache,
    pub compiler: CompilerClient,
    pub docs: DocsProxy,
    pub samples: SampleIndex,
    pub identity: Arc<dyn IdentityProvider>,
    /// Lifetime of resolved bundles.
    pub deps_ttl: Duration,
}

impl AppState {
    /// Wire up every component from configuration and a loaded symbol table.
    pub fn new(
        config: &KitchenConfig,
        table: SymbolTable,
        projects: Arc<dyn ProjectStore>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("kitchen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            resolver: Resolver::new(Arc::new(table), config.deps.bootstrap.clone()),
            cache: Cache::in_memory(config.cache.max_entries),
            compiler: CompilerClient::with_client(http.clone(), &config.compiler),
            docs: DocsProxy::with_client(http, &config.docs)?,
            samples: SampleIndex::new(projects, config.samples.ttl()),
            identity: Arc::new(TokenIdentity::new(config.server.admin_token.clone())),
            deps_ttl: config.deps.ttl(),
        })
    }

    /// Load the symbol table named by `[deps]` and build the state around it.
    pub async fn load(config: &KitchenConfig) -> Result<Self> {
        let table = load_symbol_table(&config.deps).await?;
        Self::new(config, table, Arc::new(MemoryProjectStore::new()))
    }
}

/// Start the server and run until Ctrl+C.
pub async fn serve(config: KitchenConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!("Invalid listen address: {}:{}", config.server.host, config.server.port)
        })?;

    let state = Arc::new(AppState::load(&config).await?);
    if config.server.admin_token.is_none() {
        tracing::warn!("No admin_token configured; cache flush is disabled");
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Starting Kitchen server at http://{}", addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
