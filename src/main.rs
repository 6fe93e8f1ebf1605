use analysis::{AnalysisReport, AnalysisRequest, AnalysisService};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::Config;
use core_types::AggregationPeriod;
use market_data::YahooChartClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Meridian analysis application.
#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load the layered configuration (config.toml plus MERIDIAN__* overrides)
    let config = match configuration::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return;
        }
    };

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => {
            if let Err(e) = handle_analyze(args, config).await {
                eprintln!("Error: {}", e);
            }
        }
        Commands::Serve(args) => {
            if let Err(e) = handle_serve(args, config).await {
                eprintln!("Error while serving: {}", e);
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A dividend-adjusted total return analyzer for equities.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the total return of a ticker and print the report.
    Analyze(AnalyzeArgs),
    /// Start the web server that backs the browser front-end.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// The ticker symbol to analyze (e.g., "AAPL").
    #[arg(long)]
    ticker: String,

    /// The start date of the window (format: YYYY-MM-DD).
    /// Defaults to the configured lookback ending at the end date.
    #[arg(long)]
    from: Option<String>,

    /// The end date of the window (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    to: Option<String>,

    /// The granularity of the periodic return table (monthly, quarterly, yearly).
    #[arg(long, default_value = "monthly")]
    period: AggregationPeriod,

    /// Annual risk-free rate used for the Sharpe ratio (e.g., 0.04 for 4%).
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Write a CSV snapshot of the enriched daily table and print its path.
    #[arg(long)]
    export: bool,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// Bind address override for the web server (e.g., "127.0.0.1").
    #[arg(long)]
    host: Option<String>,

    /// Port override for the web server.
    #[arg(long)]
    port: Option<u16>,
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// Runs a single analysis through the same pipeline the web server uses
/// and renders the report for the terminal.
async fn handle_analyze(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let provider = YahooChartClient::new(&config.provider);
    let service = AnalysisService::new(Arc::new(provider), config.analysis);

    let request = AnalysisRequest {
        ticker: args.ticker,
        start_date: args.from,
        end_date: args.to,
        period: args.period,
        risk_free_rate: args.risk_free_rate,
    };

    let report = service.run(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.period);
    }

    if args.export {
        let path = service.export_snapshot(&report)?;
        println!("\nCSV snapshot written to {}", path.display());
    }

    Ok(())
}

/// Prints the summary and the periodic return breakdown as tables.
fn print_report(report: &AnalysisReport, period: AggregationPeriod) {
    println!(
        "\nTotal return analysis for {} from {} to {}\n",
        report.ticker, report.start_date, report.end_date
    );

    let mut summary = Table::new();
    summary.load_preset(UTF8_FULL);
    summary.set_header(vec!["Metric", "Value"]);
    for row in &report.summary {
        summary.add_row(vec![row.metric.clone(), row.value.clone()]);
    }
    println!("{}", summary);

    let periodic = match period {
        AggregationPeriod::Monthly => &report.charts.monthly_returns,
        AggregationPeriod::Quarterly => &report.charts.quarterly_returns,
        AggregationPeriod::Yearly => &report.charts.yearly_returns,
    };
    if periodic.is_empty() {
        return;
    }

    println!("\n{} returns\n", period);
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Period", "Return (%)"]);
    for bar in periodic {
        table.add_row(vec![bar.label.clone(), format!("{:.2}", bar.value_pct)]);
    }
    println!("{}", table);
}

// ==============================================================================
// Serve Command Logic
// ==============================================================================

/// Starts the web server, letting command-line flags override the
/// configured bind address.
async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    web_server::run_server(addr, config).await
}
