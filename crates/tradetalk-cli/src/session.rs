//! Interactive menu session.
//!
//! The session owns the portfolio holdings for its whole lifetime and
//! survives every domain error; only I/O failures end it early.

use std::io::{BufRead, Write};
use std::time::Instant;

use tradetalk_core::portfolio::{self, Holdings};
use tradetalk_core::report::PortfolioReport;
use tradetalk_core::{Horizon, Quantity, Symbol, TickerDirectory, ValidationError};

use crate::cli::OutputFormat;
use crate::commands::{self, CommandOutput, Services};
use crate::error::CliError;
use crate::output::{self, View};

const SYMBOL_PROMPT: &str =
    "Stock Symbol (e.g., AAPL for Apple Inc. or RELIANCE.BO for Reliance Industries)";

pub struct Session<'a, R, W> {
    services: &'a Services,
    directory: &'a TickerDirectory,
    holdings: Holdings,
    input: R,
    output: W,
    format: OutputFormat,
    pretty: bool,
    closed: bool,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(services: &'a Services, directory: &'a TickerDirectory, input: R, output: W) -> Self {
        Self {
            services,
            directory,
            holdings: Holdings::new(),
            input,
            output,
            format: OutputFormat::Text,
            pretty: false,
            closed: false,
        }
    }

    pub fn with_format(mut self, format: OutputFormat, pretty: bool) -> Self {
        self.format = format;
        self.pretty = pretty;
        self
    }

    #[cfg(test)]
    pub fn holdings(&self) -> &Holdings {
        &self.holdings
    }

    /// Runs until the user quits or input ends.
    pub async fn run(&mut self) -> Result<(), CliError> {
        self.show(commands::home(), Instant::now())?;

        while !self.closed {
            self.say("")?;
            self.say("1) Home  2) Prediction  3) News  4) Data Analysis  5) Manage Portfolio  q) Quit")?;
            let Some(choice) = self.prompt("Menu")? else {
                break;
            };

            let started = Instant::now();
            let result = match choice.to_ascii_lowercase().as_str() {
                "1" | "home" => Ok(Some(commands::home())),
                "2" | "prediction" => self.prediction().await,
                "3" | "news" => self.news().await,
                "4" | "data analysis" | "analysis" => self.data_analysis().await,
                "5" | "portfolio" | "manage portfolio" => {
                    self.manage_portfolio().await?;
                    Ok(None)
                }
                "q" | "quit" | "exit" => break,
                "" => Ok(None),
                other => Ok(Some(CommandOutput::new(
                    View::warning(format!("Unknown menu choice '{other}'.")),
                    Vec::new(),
                ))),
            };
            self.settle(result, started)?;
        }

        tracing::info!(positions = self.holdings.len(), "session ended");
        Ok(())
    }

    async fn prediction(&mut self) -> Result<Option<CommandOutput>, CliError> {
        let Some(symbol) = self.prompt_symbol()? else {
            return Ok(self.missing_symbol());
        };

        let action = self
            .prompt("Predict or get current price? [p/c] (p)")?
            .unwrap_or_default();
        if action.eq_ignore_ascii_case("c") || action.eq_ignore_ascii_case("price") {
            return commands::price(self.services, &symbol).await.map(Some);
        }

        let days = match self.prompt(&format!(
            "Number of Days to Predict ({}-{}) [{}]",
            Horizon::MIN,
            Horizon::MAX,
            Horizon::DEFAULT.get()
        ))? {
            Some(raw) if !raw.is_empty() => match raw.parse::<i64>() {
                Ok(days) => days,
                Err(_) => {
                    return Ok(Some(CommandOutput::new(
                        View::warning(format!("'{raw}' is not a whole number of days.")),
                        Vec::new(),
                    )))
                }
            },
            _ => i64::from(Horizon::DEFAULT.get()),
        };

        let intraday = self
            .prompt("Intraday Prediction (1-minute interval)? [y/N]")?
            .is_some_and(|raw| matches!(raw.to_ascii_lowercase().as_str(), "y" | "yes"));

        commands::predict(self.services, &symbol, days, intraday)
            .await
            .map(Some)
    }

    async fn news(&mut self) -> Result<Option<CommandOutput>, CliError> {
        let Some(symbol) = self.prompt_symbol()? else {
            return Ok(self.missing_symbol());
        };
        commands::news(self.services, &symbol).await.map(Some)
    }

    async fn data_analysis(&mut self) -> Result<Option<CommandOutput>, CliError> {
        let Some(first) = self.directory.names().next().map(str::to_owned) else {
            return Ok(Some(CommandOutput::new(
                View::warning("The ticker directory is empty."),
                Vec::new(),
            )));
        };

        let query = match self.prompt(&format!("Company [{first}]"))? {
            Some(raw) if !raw.is_empty() => raw,
            _ => first,
        };

        match self.directory.resolve(&query) {
            Err(error @ ValidationError::AmbiguousCompany { .. }) => {
                Ok(Some(commands::companies(self.directory, Some(&query)).with_warning(error.to_string())))
            }
            _ => commands::analyze(self.services, self.directory, &query)
                .await
                .map(Some),
        }
    }

    async fn manage_portfolio(&mut self) -> Result<(), CliError> {
        self.say("Virtual Stock Portfolio")?;
        while !self.closed {
            self.say("b) Buy  s) Sell  v) View  t) Total value  c) Clear  back) Main menu")?;
            let Some(choice) = self.prompt("Portfolio")? else {
                break;
            };

            let started = Instant::now();
            let result = match choice.to_ascii_lowercase().as_str() {
                "b" | "buy" => self.trade(true),
                "s" | "sell" => self.trade(false),
                "v" | "view" => Ok(Some(CommandOutput::new(
                    View::Portfolio(PortfolioReport {
                        holdings: self.holdings.clone(),
                        valuation: None,
                    }),
                    Vec::new(),
                ))),
                "t" | "total" | "value" => self.valuation().await,
                "c" | "clear" => {
                    portfolio::clear(&mut self.holdings);
                    Ok(Some(CommandOutput::new(
                        View::success("Cleared your portfolio."),
                        Vec::new(),
                    )))
                }
                "" | "back" | "q" => break,
                other => Ok(Some(CommandOutput::new(
                    View::warning(format!("Unknown portfolio action '{other}'.")),
                    Vec::new(),
                ))),
            };
            self.settle(result, started)?;
        }
        Ok(())
    }

    fn trade(&mut self, buying: bool) -> Result<Option<CommandOutput>, CliError> {
        let Some(raw_symbol) = self.prompt_symbol()? else {
            return Ok(self.missing_symbol());
        };
        let symbol = Symbol::parse(&raw_symbol)?;

        let quantity = match self.prompt(&format!(
            "Quantity ({}-{}) [1]",
            Quantity::MIN,
            Quantity::MAX
        ))? {
            Some(raw) if !raw.is_empty() => match raw.parse::<i64>() {
                Ok(value) => Quantity::new(value)?,
                Err(_) => {
                    return Ok(Some(CommandOutput::new(
                        View::warning(format!("'{raw}' is not a whole number of shares.")),
                        Vec::new(),
                    )))
                }
            },
            _ => Quantity::default(),
        };

        let message = if buying {
            portfolio::buy(&mut self.holdings, &symbol, quantity.get())?;
            format!("Bought {} shares of {symbol}.", quantity.get())
        } else {
            portfolio::sell(&mut self.holdings, &symbol, quantity.get())?;
            format!("Sold {} shares of {symbol}.", quantity.get())
        };
        Ok(Some(CommandOutput::new(View::success(message), Vec::new())))
    }

    async fn valuation(&mut self) -> Result<Option<CommandOutput>, CliError> {
        let valuation = portfolio::value(&self.holdings, self.services.market.as_ref()).await?;
        Ok(Some(CommandOutput::new(
            View::Portfolio(PortfolioReport {
                holdings: self.holdings.clone(),
                valuation: Some(valuation),
            }),
            vec![self.services.market.id()],
        )))
    }

    /// Shows a result or turns a domain error into an on-screen message.
    fn settle(
        &mut self,
        result: Result<Option<CommandOutput>, CliError>,
        started: Instant,
    ) -> Result<(), CliError> {
        match result {
            Ok(Some(output)) => self.show(output, started),
            Ok(None) => Ok(()),
            Err(CliError::Core(error)) => {
                tracing::warn!(kind = %error.kind(), "session action failed: {error}");
                self.show(CommandOutput::failure(&error), started)
            }
            Err(other) => Err(other),
        }
    }

    fn show(&mut self, output: CommandOutput, started: Instant) -> Result<(), CliError> {
        let envelope = output.into_envelope(started)?;
        output::render(&mut self.output, &envelope, self.format, self.pretty)
    }

    fn missing_symbol(&self) -> Option<CommandOutput> {
        Some(CommandOutput::new(
            View::warning("Please enter a stock symbol."),
            Vec::new(),
        ))
    }

    fn prompt_symbol(&mut self) -> Result<Option<String>, CliError> {
        Ok(self.prompt(SYMBOL_PROMPT)?.filter(|raw| !raw.is_empty()))
    }

    /// `None` once input is exhausted.
    fn prompt(&mut self, label: &str) -> Result<Option<String>, CliError> {
        if self.closed {
            return Ok(None);
        }
        if self.format == OutputFormat::Text {
            write!(self.output, "{label}: ")?;
            self.output.flush()?;
        }

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.closed = true;
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn say(&mut self, text: &str) -> Result<(), CliError> {
        if self.format == OutputFormat::Text {
            writeln!(self.output, "{text}")?;
        }
        Ok(())
    }
}
