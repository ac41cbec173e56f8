//! Throwaway PostgreSQL databases for repository tests.
//!
//! One container is started per test binary; every `TestDb` gets its own
//! freshly migrated database inside it.

use sqlx::{Connection, PgConnection, PgPool};
use std::sync::atomic::{AtomicU32, Ordering};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

const USER: &str = "vendas_test";
const PASSWORD: &str = "vendas_test_password";

/// The running container and the host port it answers on. Only the port is
/// used after start-up; the handle keeps the container alive.
static POSTGRES_CONTAINER: OnceCell<(ContainerAsync<Postgres>, u16)> = OnceCell::const_new();

static NEXT_DATABASE: AtomicU32 = AtomicU32::new(0);

async fn start_container() -> (ContainerAsync<Postgres>, u16) {
    let container = Postgres::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name("postgres")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");
    (container, port)
}

fn url(port: u16, db_name: &str) -> String {
    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());
    format!("postgresql://{USER}:{PASSWORD}@{host}:{port}/{db_name}")
}

/// An isolated, migrated database. Nothing is dropped when the test ends;
/// the container is thrown away as a whole.
#[derive(Debug)]
pub struct TestDb {
    pub pool: PgPool,
}

impl TestDb {
    pub async fn new() -> Self {
        let (_, port) = POSTGRES_CONTAINER.get_or_init(start_container).await;

        let name = format!(
            "vendas_test_{}_{}",
            std::process::id(),
            NEXT_DATABASE.fetch_add(1, Ordering::Relaxed)
        );

        let mut admin = PgConnection::connect(&url(*port, "postgres"))
            .await
            .expect("Failed to connect to the admin database");
        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut admin)
            .await
            .expect("Failed to create test database");
        admin.close().await.expect("Failed to close admin connection");

        let pool = PgPool::connect(&url(*port, &name))
            .await
            .expect("Failed to create pool for test database");
        crate::run_migrations(&pool)
            .await
            .expect("Failed to run migrations on test database");

        Self { pool }
    }

    /// Rows currently in `compras`.
    pub async fn purchase_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM compras")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count purchases")
    }
}
