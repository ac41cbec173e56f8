use api_client::{BcbClient, RateIndexClient};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use configuration::{StoreBackend, settings::Config};
use database::{DbRepository, MemoryRepository, SalesStore};
use financing::FinancingPolicy;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
// Note: Tracing is handled by the binary's subscriber configuration

pub mod error;
pub mod handlers;
pub mod services;

/// The shared application state that all handlers can access.
///
/// Built once at start-up; the store and the rate client are the only
/// handles to the outside world.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SalesStore>,
    pub rate_client: Arc<dyn RateIndexClient>,
    pub policy: FinancingPolicy,
    /// Earliest start date accepted by `PUT /juros`.
    pub rate_floor: NaiveDate,
}

impl AppState {
    /// Connects the configured store (running migrations for PostgreSQL) and
    /// builds the rate client.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn SalesStore> = match config.database.backend {
            StoreBackend::Postgres => {
                let db_pool = database::connect(&config.database).await?;
                database::run_migrations(&db_pool).await?;
                Arc::new(DbRepository::new(db_pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on exit.");
                Arc::new(MemoryRepository::new())
            }
        };
        let rate_client = Arc::new(BcbClient::new(&config.rate_index)?);

        Ok(Self {
            store,
            rate_client,
            policy: FinancingPolicy::from(&config.financing),
            rate_floor: config.rate_index.floor_date,
        })
    }
}

/// Defines the application routes and middleware.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/produtos", post(handlers::create_product))
        .route(
            "/compras",
            post(handlers::create_purchase).get(handlers::list_purchases),
        )
        .route("/juros", put(handlers::update_interest_rate))
        .route("/estatistica", get(handlers::get_statistics))
        .with_state(Arc::new(state))
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
