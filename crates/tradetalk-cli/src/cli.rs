//! CLI argument definitions for tradetalk.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `menu` | Interactive dashboard (default) |
//! | `home` | Welcome text |
//! | `predict` | ARIMA forecast with chart and current price |
//! | `price` | Latest close for a symbol |
//! | `news` | Articles from the last seven days |
//! | `analyze` | Ten-year statistics for a directory company |
//! | `companies` | List or search the ticker directory |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `text` | Output format (text, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use deterministic offline data |
//! | `--directory` | `cname.xls` | Ticker directory spreadsheet |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//! | `-v` | warn | Repeat for info/debug logs on stderr |

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "tradetalk",
    author,
    version,
    about = "Stock lookup, forecasting, news and a toy portfolio in your terminal"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve deterministic offline data instead of calling providers.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Ticker directory spreadsheet (overrides TRADETALK_DIRECTORY).
    #[arg(long, global = true)]
    pub directory: Option<PathBuf>,

    /// Request timeout in milliseconds (overrides TRADETALK_TIMEOUT_MS).
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with ASCII charts.
    Text,
    /// JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive menu: Home, Prediction, News, Data Analysis, Manage Portfolio.
    Menu,

    /// Show the welcome screen.
    Home,

    /// Forecast future closes with ARIMA(5,1,0).
    ///
    ///   tradetalk predict AAPL --days 10
    ///   tradetalk predict RELIANCE.BO --intraday
    Predict(PredictArgs),

    /// Latest close for a symbol.
    Price(SymbolArgs),

    /// Recent news articles for a symbol.
    News(SymbolArgs),

    /// Statistics, price chart and distribution for a directory company.
    Analyze(AnalyzeArgs),

    /// List directory companies, optionally filtered by name.
    Companies(CompaniesArgs),
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// Ticker symbol, e.g. AAPL or RELIANCE.BO.
    pub symbol: String,

    /// Number of periods to predict (1-30).
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    pub days: i64,

    /// Fit on today's one-minute bars instead of daily closes.
    #[arg(long, default_value_t = false)]
    pub intraday: bool,
}

#[derive(Debug, Args)]
pub struct SymbolArgs {
    /// Ticker symbol, e.g. AAPL or RELIANCE.BO.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Company name as listed in the directory (unique substrings work).
    pub company: String,
}

#[derive(Debug, Args)]
pub struct CompaniesArgs {
    /// Case-insensitive name filter.
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["tradetalk"]).expect("parses");
        assert!(cli.command.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn predict_defaults_to_ten_days() {
        let cli = Cli::try_parse_from(["tradetalk", "predict", "AAPL", "--mock"]).expect("parses");
        let Some(Command::Predict(args)) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.days, 10);
        assert!(!args.intraday);
        assert!(cli.mock);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tradetalk",
            "price",
            "MSFT",
            "--format",
            "json",
            "--pretty",
            "-vv",
            "--timeout-ms",
            "2500",
        ])
        .expect("parses");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.pretty);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.timeout_ms, Some(2500));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let error = Cli::try_parse_from(["tradetalk", "price", "MSFT", "--timeout-ms", "0"])
            .expect_err("zero timeout");
        assert_eq!(error.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
