//! protestwire - Resilience gateway for a protest news aggregator
//!
//! Wires the shared store, cache tier, rate limiter, search facade, and
//! translation pipeline behind the HTTP surface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use protestwire::api::{create_router, AppState};
use protestwire::cache::CacheStore;
use protestwire::config::Config;
use protestwire::limiter::{RateLimitConfig, RateLimiter};
use protestwire::search::{ArticleCorpus, HostedIndex, HttpCorpus, NoCorpus, SearchFacade};
use protestwire::store::{RedisStore, SharedStore};
use protestwire::tasks::spawn_sweep_task;
use protestwire::translate::{RemoteTranslator, TranslationPipeline, TranslationProvider};

/// Main entry point for the gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the shared store (degraded mode if unreachable)
/// 4. Build cache tier, rate limiter, search facade, translation pipeline
/// 5. Start the background window sweep task
/// 6. Create Axum router with all endpoints
/// 7. Start HTTP server, handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "protestwire=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting protestwire gateway");

    let config = Arc::new(Config::from_env());
    info!(
        "Configuration loaded: port={}, rate_limit={}/{}ms, fallback_corpus_limit={}",
        config.server_port,
        config.rate_limit_max_requests,
        config.rate_limit_window_ms,
        config.fallback_corpus_limit
    );

    let remote_timeout = Duration::from_millis(config.remote_timeout_ms);
    let http = reqwest::Client::new();

    // Shared store: unreachable or unconfigured means the cache runs cold and
    // the limiter uses its in-process fallback; startup never fails over it.
    let store: Option<Arc<dyn SharedStore>> = match &config.redis_url {
        Some(url) => match RedisStore::connect(url, remote_timeout).await {
            Ok(store) => Some(Arc::new(store)),
            Err(err) => {
                warn!(error = %err, "shared store unreachable, running degraded");
                None
            }
        },
        None => {
            warn!("no shared store configured, running degraded");
            None
        }
    };

    let cache = Arc::new(CacheStore::new(store.clone()));
    let limiter = Arc::new(RateLimiter::new(
        RateLimitConfig::new(config.rate_limit_max_requests, config.rate_limit_window_ms),
        store,
    ));

    let hosted = match (&config.search_index_url, &config.search_index_key) {
        (Some(url), Some(key)) => Some(HostedIndex::new(
            http.clone(),
            url.clone(),
            key.clone(),
            config.search_index_uid.clone(),
            remote_timeout,
        )),
        _ => None,
    };
    let corpus: Arc<dyn ArticleCorpus> = match &config.corpus_url {
        Some(url) => Arc::new(HttpCorpus::new(http.clone(), url.clone(), remote_timeout)),
        None => Arc::new(NoCorpus),
    };
    let facade = Arc::new(SearchFacade::new(
        hosted,
        corpus,
        config.fallback_corpus_limit,
    ));

    let provider: Option<Arc<dyn TranslationProvider>> = config.translate_url.as_ref().map(|url| {
        Arc::new(RemoteTranslator::new(
            http.clone(),
            url.clone(),
            config.translate_key.clone(),
            remote_timeout,
        )) as Arc<dyn TranslationProvider>
    });
    let pipeline = Arc::new(TranslationPipeline::new(
        limiter.clone(),
        cache.clone(),
        provider,
        Duration::from_secs(config.translation_cache_ttl),
    ));

    // Select a search backend up front rather than on the first request; a
    // failure here still leaves the facade free to retry lazily.
    match facade.initialize().await {
        Ok(mode) => info!(mode = ?mode, "search backend ready"),
        Err(err) => warn!(error = %err, "search backend not ready at startup"),
    }

    let sweep_handle = spawn_sweep_task(limiter.clone(), config.sweep_interval);
    info!("Background sweep task started");

    let state = AppState {
        facade,
        pipeline,
        limiter,
        cache,
        config: config.clone(),
    };
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweep_handle.abort();
    warn!("Sweep task aborted");
}
