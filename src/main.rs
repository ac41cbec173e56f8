use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{LoggingSettings, StoreBackend};
use core_types::{PurchaseStats, PurchaseView, RateSnapshot, RateWindow};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use web_server::{AppState, services};

/// The main entry point for the sales and financing service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; DATABASE_URL may come from the environment.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = configuration::load_config().context("Failed to load configuration")?;
    if let Some(backend) = cli.backend {
        config.database.backend = backend;
    }
    let _guard = init_tracing(&config.logging);

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                config.server.port = port;
            }
            let state = AppState::from_config(&config).await?;
            web_server::run_server(config.server.socket_addr(), state).await?;
        }
        Commands::RefreshRate(args) => {
            let state = AppState::from_config(&config).await?;
            handle_refresh_rate(args, &state).await?;
        }
        Commands::Report => {
            let state = AppState::from_config(&config).await?;
            handle_report(&state).await?;
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Product sales with installment financing priced from the Selic rate.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Overrides `database.backend` from the configuration.
    #[arg(long, global = true, value_enum)]
    backend: Option<StoreBackend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Recompute the interest-rate snapshot for a date window.
    RefreshRate(RefreshRateArgs),
    /// Print the registered purchases, their totals and the current rate.
    Report,
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.port` from the configuration.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct RefreshRateArgs {
    /// First day of the window (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// Last day of the window, inclusive (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,
}

/// Installs the global subscriber. Console output always; a daily rolling
/// file as well when `logging.directory` is set.
///
/// The returned guard flushes the file writer and must outlive the program.
fn init_tracing(logging: &LoggingSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "vendas.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

// ==============================================================================
// Refresh-Rate Command Logic
// ==============================================================================

/// Runs the same validation and update as `PUT /juros`.
async fn handle_refresh_rate(args: RefreshRateArgs, state: &AppState) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let window = RateWindow::new(
        args.from,
        args.to,
        args.from.to_string(),
        args.to.to_string(),
        state.rate_floor,
        today,
    )?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Fetching the daily rates from {} to {}...", window.start, window.end));

    match services::refresh_interest_rate(state, &window).await {
        Ok(rate) => {
            spinner.finish_with_message(format!("New interest rate: {rate}%"));
            Ok(())
        }
        Err(e) => {
            spinner.abandon_with_message("Rate refresh failed.");
            Err(e.into())
        }
    }
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

async fn handle_report(state: &AppState) -> anyhow::Result<()> {
    let purchases = state.store.list_purchases().await?;
    let stats = state.store.purchase_stats().await?;
    let snapshot = state.store.current_rate_snapshot().await?;

    if purchases.is_empty() {
        println!("No purchases registered.");
    } else {
        println!("{}", purchases_table(&purchases));
    }
    println!("{}", stats_table(&stats, snapshot.as_ref()));
    Ok(())
}

fn purchases_table(purchases: &[PurchaseView]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Purchase",
        "Product",
        "Kind",
        "Price",
        "Down payment",
        "Installments",
        "Installment",
        "Rate %",
        "Total paid",
    ]);
    for purchase in purchases {
        table.add_row(vec![
            purchase.purchase_id.to_string(),
            purchase.product_name.clone(),
            purchase.product_kind.clone().unwrap_or_default(),
            purchase.product_price.to_string(),
            purchase.down_payment.to_string(),
            purchase.installments.to_string(),
            purchase.installment_amount.to_string(),
            purchase.interest_rate.to_string(),
            purchase.total_paid().to_string(),
        ]);
    }
    table
}

fn stats_table(stats: &PurchaseStats, snapshot: Option<&RateSnapshot>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Purchases".to_string(), stats.count.to_string()]);
    table.add_row(vec!["Total paid".to_string(), stats.sum.to_string()]);
    table.add_row(vec!["Average paid".to_string(), stats.avg.to_string()]);
    table.add_row(vec!["Total interest".to_string(), stats.sum_tx.to_string()]);
    table.add_row(vec!["Average interest".to_string(), stats.avg_tx.to_string()]);
    match snapshot {
        Some(snapshot) => {
            let window = format!(
                "{} to {}",
                snapshot.start_date.as_deref().unwrap_or("-"),
                snapshot.end_date.as_deref().unwrap_or("-")
            );
            table.add_row(vec!["Current rate %".to_string(), snapshot.rate.to_string()]);
            table.add_row(vec!["Rate window".to_string(), window]);
        }
        None => {
            table.add_row(vec!["Current rate %".to_string(), "not set".to_string()]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn stats_table_reports_a_missing_snapshot() {
        let rendered = stats_table(&PurchaseStats::default(), None).to_string();
        assert!(rendered.contains("not set"));
        assert!(rendered.contains("Purchases"));
    }

    #[test]
    fn stats_table_shows_the_snapshot_window() {
        let snapshot = RateSnapshot {
            rate: Decimal::new(1075, 2),
            start_date: Some("2024-01-01".to_string()),
            end_date: None,
        };
        let rendered = stats_table(&PurchaseStats::default(), Some(&snapshot)).to_string();
        assert!(rendered.contains("10.75"));
        assert!(rendered.contains("2024-01-01 to -"));
    }

    #[test]
    fn cli_parses_the_refresh_window() {
        let cli = Cli::parse_from([
            "vendas",
            "--backend",
            "memory",
            "refresh-rate",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ]);
        assert_eq!(cli.backend, Some(StoreBackend::Memory));
        match cli.command {
            Commands::RefreshRate(args) => {
                assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
                assert_eq!(args.to, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
            }
            _ => panic!("expected refresh-rate"),
        }
    }
}
