use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod executor;
pub mod provider;
pub mod scheduler;
pub mod service;
pub mod store;

use api::AppState;
use executor::RunExecutor;
use provider::{HttpProvider, KeywordProvider, SimulatedProvider};
use scheduler::Scheduler;
use store::{MemoryRunStore, RunStore, SqliteRunStore};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quarry_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quarry Orchestrator...");

    let config = config::Config::from_env().expect("Invalid configuration");

    let store: Arc<dyn RunStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Using SQLite store at {}", url);
            Arc::new(
                SqliteRunStore::connect(url)
                    .await
                    .expect("Failed to connect to database"),
            )
        }
        None => {
            tracing::info!("Using in-memory store (runs are lost on restart)");
            Arc::new(MemoryRunStore::new())
        }
    };

    let provider: Arc<dyn KeywordProvider> = match &config.provider {
        Some(settings) => {
            tracing::info!("Using HTTP provider at {}", settings.base_url);
            Arc::new(HttpProvider::new(&settings.base_url, &settings.api_key))
        }
        None => {
            tracing::info!("Using simulated provider (no PROVIDER_BASE_URL configured)");
            Arc::new(SimulatedProvider::new())
        }
    };

    let executor = Arc::new(RunExecutor::new(store.clone(), provider));
    let scheduler = Arc::new(Scheduler::new(store.clone(), executor.clone()));
    scheduler.clone().spawn_tick_loop(config.scheduler_tick);

    // Build router with all API endpoints
    let app = api::create_router(AppState {
        store,
        executor,
        scheduler,
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
