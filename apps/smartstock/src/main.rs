//! # smartstock
//!
//! Command-line entry point.
//!
//! ```text
//! smartstock [--config PATH] [--user NAME] seed
//! smartstock [--config PATH] [--user NAME] backfill-codes
//! smartstock [--config PATH] report [--recent N]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use smartstock::{start, AppConfig, AppResult, InventoryService};
use smartstock_core::command::{Command, NewProduct, NewWarehouse};
use smartstock_core::{AuditQuery, Money, UNASSIGNED_LABEL};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smartstock")]
#[command(about = "Inventory ledger with an append-only activity log")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Actor recorded in the activity log (defaults to ledger.default_actor)
    #[arg(long)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create demo warehouses and products in an empty inventory
    Seed,

    /// Give products that lack a product code the next free PROD-NNN code
    BackfillCodes,

    /// Print the inventory summary, warehouse statistics and recent activity
    Report {
        /// Number of activity log entries to show
        #[arg(long, default_value = "10")]
        recent: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "smartstock failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.config)?;
    let actor = cli.user.unwrap_or_else(|| config.ledger.default_actor.clone());

    let service = start(&config).await?;
    info!(actor = %actor, "SmartStock started");

    let result = match cli.command {
        Commands::Seed => seed(&service, &actor).await,
        Commands::BackfillCodes => backfill_codes(&service, &actor).await,
        Commands::Report { recent } => {
            report(&service, recent);
            Ok(())
        }
    };

    service.shutdown().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - Default: `info,smartstock=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,smartstock=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Subcommands
// =============================================================================

const DEMO_WAREHOUSES: &[(&str, &str, &str, &str)] = &[
    ("Main", "North Industrial Park, Bay 4", "Sara Khan", "+1 555 0100"),
    ("Overflow", "Riverside Depot", "", ""),
];

/// (name, category, quantity, purchase cents, selling cents, warehouse)
const DEMO_PRODUCTS: &[(&str, &str, i64, i64, i64, Option<&str>)] = &[
    ("Cordless Drill", "Tools", 12, 4_500, 6_999, Some("Main")),
    ("Safety Goggles", "Safety", 40, 350, 799, Some("Main")),
    ("Work Gloves", "Safety", 3, 420, 950, Some("Overflow")),
    ("Tape Measure", "Tools", 25, 600, 1_299, None),
];

async fn seed(service: &InventoryService, actor: &str) -> AppResult<()> {
    let catalog = service.catalog();
    if catalog.warehouse_count() > 0 || catalog.product_count() > 0 {
        info!("Inventory is not empty, skipping seed");
        println!("Inventory already has data; nothing seeded.");
        return Ok(());
    }

    for (name, location, manager, contact) in DEMO_WAREHOUSES {
        let receipt = service
            .execute(
                actor,
                Command::CreateWarehouse(
                    NewWarehouse::new(*name, *location).managed_by(*manager, *contact),
                ),
            )
            .await?;
        println!("Created warehouse {}", receipt.audit.product_name);
    }

    for (name, category, quantity, purchase, selling, warehouse) in DEMO_PRODUCTS {
        let mut input = NewProduct::new(
            *name,
            *category,
            *quantity,
            Money::from_cents(*purchase),
            Money::from_cents(*selling),
        )
        .with_code(service.catalog().next_product_code());
        if let Some(w) = warehouse {
            input = input.in_warehouse(*w);
        }

        let receipt = service.execute(actor, Command::CreateProduct(input)).await?;
        if let Some(product) = receipt.product() {
            println!(
                "Created product {} ({}) x{}",
                product.name,
                product.product_code.as_deref().unwrap_or("-"),
                product.quantity
            );
        }
    }

    Ok(())
}

async fn backfill_codes(service: &InventoryService, actor: &str) -> AppResult<()> {
    let updated = service.backfill_product_codes(actor).await?;
    if updated.is_empty() {
        println!("Every product already has a code.");
    }
    for product in updated {
        println!(
            "{} -> {}",
            product.name,
            product.product_code.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn report(service: &InventoryService, recent: usize) {
    let summary = service.summary();
    println!("Inventory");
    println!("  Products:           {}", summary.total_products);
    println!("  Low stock:          {}", summary.low_stock);
    println!("  Warehouses in use:  {}", summary.warehouses_in_use);

    println!();
    println!("Warehouses");
    for warehouse in service.warehouses("") {
        let stats = service.warehouse_stats(&warehouse.name);
        println!(
            "  {:<16} {:>4} products {:>6} units  value {}",
            warehouse.name, stats.product_count, stats.total_quantity, stats.stock_value
        );
    }

    let unassigned = service.catalog().unassigned_products().len();
    if unassigned > 0 {
        println!("  {:<16} {:>4} products", UNASSIGNED_LABEL, unassigned);
    }

    println!();
    println!("Recent activity");
    for entry in service.audit(&AuditQuery::recent(recent)) {
        println!(
            "  {}  {:<10} {:<18} {} ({})",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.user,
            entry.action.as_str(),
            entry.product_name,
            entry.quantity
        );
    }
}
