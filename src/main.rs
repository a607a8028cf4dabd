use analytics::{AnalyticsEngine, PerformanceReport};
use anyhow::{Context, Result};
use backtester::{Backtester, RejectionPolicy};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, VenuePreset, load_config};
use core_types::{ROUND_TO, Transaction, round_to};
use executor::{Portfolio, exchange_from_settings};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod backtest;
mod replay;

/// The main entry point for the Tally trade-accounting tool.
fn main() -> Result<()> {
    // Load environment variables from a .env file, if one exists
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command-line arguments
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Replay(args) => handle_replay(args, &config),
        Commands::Backtest(args) => handle_backtest(args, &config),
        Commands::Quote(args) => handle_quote(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Books trades into a fee-aware portfolio ledger and reports on the result.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the exchange fee model from the configuration.
    #[arg(long, value_enum, global = true)]
    venue: Option<VenuePreset>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV file of trades and print the ledger and performance report.
    Replay(ReplayArgs),
    /// Run a buy-below / sell-above strategy day by day over a CSV of prices.
    Backtest(BacktestArgs),
    /// Show how much of a ticker a cash balance buys, and what it costs.
    Quote(QuoteArgs),
}

#[derive(Parser)]
struct ReplayArgs {
    /// CSV file with `date,ticker,side,price,quantity,percentage` columns.
    #[arg(long)]
    trades: PathBuf,

    /// Starting cash. Overrides `simulation.initial_cash`.
    #[arg(long)]
    initial_cash: Option<Decimal>,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Abort on the first rejected trade instead of skipping it.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser)]
struct BacktestArgs {
    /// CSV file with `date,ticker,open,high,low,close` columns.
    #[arg(long)]
    prices: PathBuf,

    /// The ticker the strategy trades.
    #[arg(long)]
    ticker: String,

    /// Buy when the close falls below this price and nothing is held.
    #[arg(long)]
    buy_below: Decimal,

    /// Sell the whole position when the close rises above this price.
    #[arg(long)]
    sell_above: Decimal,

    /// Share of cash (0-100) committed to each buy.
    #[arg(long, default_value = "100")]
    percentage: Decimal,

    /// First day of the run (format: YYYY-MM-DD). Defaults to the first day in the price file.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Day the run stops before (format: YYYY-MM-DD). Defaults to the day after the last price.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Starting cash. Overrides `simulation.initial_cash`.
    #[arg(long)]
    initial_cash: Option<Decimal>,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Abort on the first rejected trade instead of skipping it.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser)]
struct QuoteArgs {
    #[arg(long)]
    ticker: String,

    /// The price of one unit.
    #[arg(long)]
    price: Decimal,

    /// The cash available to spend.
    #[arg(long)]
    cash: Decimal,

    /// The trading date to quote for (format: YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long)]
    date: Option<NaiveDate>,
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(venue) = cli.venue {
        config.simulation.exchange = venue.into();
    }
    Ok(config)
}

// ==============================================================================
// Replay Command Logic
// ==============================================================================

fn handle_replay(args: ReplayArgs, config: &Config) -> Result<()> {
    let exchange = exchange_from_settings(&config.simulation.exchange);
    let initial_cash = args.initial_cash.unwrap_or(config.simulation.initial_cash);
    let mut portfolio = Portfolio::new(exchange, initial_cash)?;

    let file = File::open(&args.trades).with_context(|| format!("open trades csv: {}", args.trades.display()))?;
    let rows = replay::load_trades(file)?;
    tracing::info!(rows = rows.len(), exchange = portfolio.exchange().name(), %initial_cash, "Replaying trades");

    let summary = replay::replay(&mut portfolio, &rows, args.strict)?;
    tracing::info!(applied = summary.applied, rejected = summary.rejected, "Replay complete");

    let report = AnalyticsEngine::new().calculate(&portfolio);
    print_results(&portfolio, &report, args.json)
}

// ==============================================================================
// Backtest Command Logic
// ==============================================================================

fn handle_backtest(args: BacktestArgs, config: &Config) -> Result<()> {
    let exchange = exchange_from_settings(&config.simulation.exchange);
    let initial_cash = args.initial_cash.unwrap_or(config.simulation.initial_cash);
    let mut portfolio = Portfolio::new(exchange, initial_cash)?;

    let file = File::open(&args.prices).with_context(|| format!("open prices csv: {}", args.prices.display()))?;
    let book = backtest::load_prices(file)?;

    let start = args.from.or(book.first_date()).context("price file holds no bars")?;
    let end = args
        .to
        .or_else(|| book.last_date().and_then(|last| last.succ_opt()))
        .context("price file holds no bars")?;

    let strategy = backtest::ThresholdStrategy {
        ticker: args.ticker,
        buy_below: args.buy_below,
        sell_above: args.sell_above,
        buy_percentage: args.percentage,
    };
    let policy = if args.strict { RejectionPolicy::Abort } else { RejectionPolicy::Skip };

    let report = Backtester::new(book, policy)
        .run(&mut portfolio, start, end, |date, portfolio, prices| strategy.on_tick(date, portfolio, prices))
        .context("Backtest failed")?;
    print_results(&portfolio, &report, args.json)
}

fn print_results(portfolio: &Portfolio, report: &PerformanceReport, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "transactions": portfolio.transactions(),
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", ledger_table(portfolio.transactions()));
        println!("{}", report_table(report));
    }
    Ok(())
}

fn ledger_table(transactions: &[Transaction]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Date", "Ticker", "Side", "Price", "Quantity", "Cost", "Fee", "Cash Δ", "Gain", "Outcome", "Streak", "Cash",
    ]);
    for t in transactions {
        table.add_row(vec![
            t.time.to_string(),
            t.ticker.clone(),
            t.side().to_string(),
            t.price.to_string(),
            t.quantity.to_string(),
            t.cost.to_string(),
            t.fee.to_string(),
            t.cash_delta.to_string(),
            t.gain.to_string(),
            t.outcome().map_or_else(String::new, |outcome| outcome.to_string()),
            t.streak.to_string(),
            t.cash.to_string(),
        ]);
    }
    table
}

fn report_table(report: &PerformanceReport) -> Table {
    let opt = |value: Option<Decimal>| value.map_or_else(|| "n/a".to_string(), |v| v.to_string());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    let rows = [
        ("Exchange", report.exchange.clone()),
        ("Initial Cash", report.initial_cash.to_string()),
        ("Final Cash", report.final_cash.to_string()),
        ("Net Performance (%)", report.net_performance_pct.to_string()),
        ("Tickers", report.tickers.join(", ")),
        ("Transactions", report.total_transactions.to_string()),
        ("Buys / Sells", format!("{} / {}", report.buys, report.sells)),
        ("Total Fees", report.total_fees.to_string()),
        ("Wins / Losses", format!("{} / {}", report.wins, report.losses)),
        ("Win Rate (%)", opt(report.win_rate_pct)),
        ("Loss Rate (%)", opt(report.loss_rate_pct)),
        ("Avg / Max Win Streak", format!("{} / {}", opt(report.avg_win_streak), report.max_win_streak)),
        ("Avg / Max Loss Streak", format!("{} / {}", opt(report.avg_loss_streak), report.max_loss_streak)),
        ("Avg Win", opt(report.avg_win)),
        ("Avg Loss", opt(report.avg_loss)),
        ("Avg Return", opt(report.avg_return)),
        ("Reward to Risk", opt(report.reward_to_risk_ratio)),
        ("Trades per Day", opt(report.trades_per_day)),
        ("Trades per Month", opt(report.trades_per_month)),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    table
}

// ==============================================================================
// Quote Command Logic
// ==============================================================================

fn handle_quote(args: QuoteArgs, config: &Config) -> Result<()> {
    let exchange = exchange_from_settings(&config.simulation.exchange);
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());

    let quantity = exchange.max_quantity(&args.ticker, args.price, args.cash);
    let cost = round_to(args.price * quantity, ROUND_TO);
    let fee = exchange.fee_for_buy(&args.ticker, date, args.price, quantity);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Exchange", "Ticker", "Date", "Quantity", "Cost", "Fee", "Total"]);
    table.add_row(vec![
        exchange.name().to_string(),
        args.ticker,
        date.to_string(),
        quantity.to_string(),
        cost.to_string(),
        fee.to_string(),
        (cost + fee).to_string(),
    ]);
    println!("{table}");
    Ok(())
}
