//! PairLab CLI: run, diagnose, sweep and config commands.
//!
//! Commands:
//! - `run`: walk-forward simulation of one pair, with artifacts written to disk
//! - `diagnose`: whole-sample spread quality, stability and tradability verdict
//! - `sweep`: grid over the signal window and thresholds, ranked by Sharpe
//! - `config`: print the default TOML config

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use pairlab_runner::diagnose::render;
use pairlab_runner::{
    diagnose, load_pair, run_pair, save_artifacts, synthetic_pair, PairConfig, PairData, PairRunResult,
    ParamSweep, SignalGrid, SyntheticOptions,
};

#[derive(Parser)]
#[command(name = "pairlab", about = "PairLab CLI: regime-aware pairs trading simulator")]
struct Cli {
    /// Log progress (info level).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Log everything (debug level).
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the two price legs come from.
#[derive(Args)]
struct DataArgs {
    /// CSV for the x leg (date + close columns).
    #[arg(long, requires = "y")]
    x: Option<PathBuf>,

    /// CSV for the y leg (date + close columns).
    #[arg(long, requires = "x")]
    y: Option<PathBuf>,

    /// Generate a synthetic cointegrated pair instead of loading CSVs.
    #[arg(long, default_value_t = false, conflicts_with_all = ["x", "y"])]
    synthetic: bool,

    /// Synthetic series length.
    #[arg(long, default_value_t = 750)]
    synthetic_len: usize,

    /// Synthetic RNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a walk-forward simulation and save artifacts.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,

        /// Override the first simulated step.
        #[arg(long)]
        start_index: Option<usize>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Score a pair's spread and report whether it is tradable.
    Diagnose {
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,

        /// Print JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Sweep signal parameters and rank the runs.
    Sweep {
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,

        /// Number of runs to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Run the grid on a single thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Print the default config as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    match cli.command {
        Commands::Run {
            config,
            data,
            start_index,
            output_dir,
        } => run_cmd(config, data, start_index, output_dir),
        Commands::Diagnose { config, data, json } => diagnose_cmd(config, data, json),
        Commands::Sweep {
            config,
            data,
            top,
            sequential,
        } => sweep_cmd(config, data, top, sequential),
        Commands::Config => {
            print!("{}", PairConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(path: Option<PathBuf>) -> Result<PairConfig> {
    match path {
        Some(path) => PairConfig::load(&path).with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PairConfig::default()),
    }
}

fn load_data(args: &DataArgs) -> Result<PairData> {
    if args.synthetic {
        return Ok(synthetic_pair(&SyntheticOptions {
            len: args.synthetic_len,
            seed: args.seed,
            ..Default::default()
        }));
    }
    match (&args.x, &args.y) {
        (Some(x), Some(y)) => Ok(load_pair(x, y)?),
        _ => bail!("either --x and --y, or --synthetic, is required"),
    }
}

fn run_cmd(
    config_path: Option<PathBuf>,
    data_args: DataArgs,
    start_index: Option<usize>,
    output_dir: PathBuf,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(start) = start_index {
        config.engine.start_index = start;
    }
    let data = load_data(&data_args)?;

    let result = run_pair(&config, &data)?;
    print_summary(&result);

    let run_dir = save_artifacts(&result, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn diagnose_cmd(config_path: Option<PathBuf>, data_args: DataArgs, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let data = load_data(&data_args)?;
    let diag = diagnose(&config, &data)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&diag)?);
    } else {
        print!("{}", render(&diag));
    }
    Ok(())
}

fn sweep_cmd(config_path: Option<PathBuf>, data_args: DataArgs, top: usize, sequential: bool) -> Result<()> {
    let base = load_config(config_path)?;
    let data = load_data(&data_args)?;
    let grid = SignalGrid::default();

    let results = ParamSweep::new(&data)
        .with_parallelism(!sequential)
        .sweep(&grid, &base)?;

    println!("{} runs", results.len());
    println!(
        "{:<8} {:>7} {:>7} {:>8} {:>10} {:>8} {:>7}",
        "Window", "Entry", "Exit", "Sharpe", "Return", "MaxDD", "Trades"
    );
    println!("{}", "-".repeat(61));
    for r in results.top_n(top) {
        let s = &r.summary;
        println!(
            "{:<8} {:>7.2} {:>7.2} {:>8.3} {:>9.2}% {:>7.2}% {:>7}",
            r.config.signal.window,
            r.config.signal.entry_z,
            r.config.signal.exit_z,
            s.sharpe,
            s.total_return * 100.0,
            s.max_drawdown * 100.0,
            s.trade_count
        );
    }
    Ok(())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

fn print_summary(result: &PairRunResult) {
    let s = &result.summary;
    println!();
    println!("=== Pair Run ===");
    println!("Name:           {}", result.config.name);
    println!("Run ID:         {}", result.run_id);
    println!(
        "Period:         {} to {}",
        format_date(result.start_date()),
        format_date(result.end_date())
    );
    println!("Steps:          {}", s.steps);
    println!("Trades:         {}", s.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Final Equity:   {:.4}", s.final_equity);
    println!("Total Return:   {:.2}%", s.total_return * 100.0);
    println!("Sharpe:         {:.3}", s.sharpe);
    println!("Volatility:     {:.2}%", s.volatility * 100.0);
    println!("Max Drawdown:   {:.2}%", s.max_drawdown * 100.0);
    println!("Exposure:       {:.1}%", s.exposure * 100.0);
    println!("Turnover:       {:.2}", s.total_turnover);
    println!("Costs:          {:.4}", s.total_cost);
    println!();
    println!("--- Regimes ---");
    for (label, count) in &s.regime_counts {
        println!("{label:<15} {count}");
    }
    if result.synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
