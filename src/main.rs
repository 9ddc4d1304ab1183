//! Shop Diagnostics binary entry point.
//!
//! Seeds the shop database, runs read routes under the SQL recorder, and
//! prints query plans. Logs and SQL reports go to stderr; command output
//! goes to stdout.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use clap::{Parser, Subcommand};
use shop_diagnostics::catalog::Catalog;
use shop_diagnostics::config::Config;
use shop_diagnostics::diagnostics::RequestDiagnostics;
use shop_diagnostics::error::AppError;
use shop_diagnostics::seed::{SeedPlan, Seeder};
use shop_diagnostics::storage::ShopStorage;

/// SQL diagnostics sandbox for a small shop database.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Top the database up with synthetic data.
    Seed(SeedArgs),
    /// Run a read route and print its JSON response.
    Request(RequestArgs),
    /// Print the query plan of the first statement a route runs.
    Explain(ExplainArgs),
}

#[derive(Parser)]
struct SeedArgs {
    /// Number of users to have, admin included.
    #[arg(long, default_value_t = 100)]
    users: u64,

    /// Number of products to have.
    #[arg(long, default_value_t = 1000)]
    products: u64,

    /// Number of orders to have.
    #[arg(long, default_value_t = 500)]
    orders: u64,

    /// Random seed (defaults to `SEED`).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser)]
struct RequestArgs {
    /// Route path, e.g. "/orders/dashboard/?status=shipped".
    path: String,

    /// Log the SQL report even when `SHOP_DEBUG` is off.
    #[arg(long)]
    debug: bool,
}

#[derive(Parser)]
struct ExplainArgs {
    /// Route path, e.g. "/products/recent/".
    path: String,

    /// Also execute the statement once and report its time.
    #[arg(long)]
    analyze: bool,
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr only (stdout is for command output)
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string())
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::debug!(
        "Configuration loaded: database={}, slow_threshold={}ms",
        config.database_path,
        config.slow_query_threshold_ms
    );

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
async fn run(command: Commands, config: &Config) -> Result<(), AppError> {
    let storage = ShopStorage::new(&config.database_path).await?;

    match command {
        Commands::Seed(args) => {
            let plan = SeedPlan {
                users: args.users,
                products: args.products,
                orders: args.orders,
            };
            let seed = args.seed.unwrap_or(config.seed);
            let report = Seeder::new(storage, seed).run(&plan).await?;
            println!(
                "Created {} categories, {} users, {} products, {} orders",
                report.categories_created,
                report.users_created,
                report.products_created,
                report.orders_created
            );
        }
        Commands::Request(args) => {
            let diagnostics = RequestDiagnostics::new(config.request_diagnostics(args.debug));
            let (body, _report) = Catalog::default()
                .handle_request(&diagnostics, &storage, &args.path)
                .await;
            let body = body?;
            println!(
                "{}",
                serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
            );
        }
        Commands::Explain(args) => {
            match Catalog::default()
                .explain_route(&storage, &args.path, args.analyze)
                .await?
            {
                Some(explanation) => print!("{}", explanation.render()),
                None => println!("{} ran no statements", args.path),
            }
        }
    }

    Ok(())
}
