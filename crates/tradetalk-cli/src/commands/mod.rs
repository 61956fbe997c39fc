mod analyze;
mod companies;
mod home;
mod news;
mod predict;
mod price;

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use tradetalk_core::{
    AppConfig, CoreError, Envelope, EnvelopeError, EnvelopeMeta, MarketDataGateway, NewsApiClient, NewsGateway,
    ProviderId, TickerDirectory, YahooMarketData,
};

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;
use crate::output::{self, View};

pub use analyze::analyze;
pub use companies::companies;
pub use home::home;
pub use news::news;
pub use predict::predict;
pub use price::price;

/// Gateways and configuration shared by every flow.
pub struct Services {
    pub config: AppConfig,
    pub market: Arc<dyn MarketDataGateway>,
    pub news: Arc<dyn NewsGateway>,
}

impl Services {
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            market: Arc::new(YahooMarketData::from_config(&config)),
            news: Arc::new(NewsApiClient::from_config(&config)),
            config,
        }
    }

    #[cfg(test)]
    pub fn with_gateways(
        config: AppConfig,
        market: Arc<dyn MarketDataGateway>,
        news: Arc<dyn NewsGateway>,
    ) -> Self {
        Self {
            config,
            market,
            news,
        }
    }

    pub fn load_directory(&self) -> Result<TickerDirectory, CoreError> {
        TickerDirectory::load(self.config.directory())
    }
}

/// A rendered-ready view plus the metadata that goes into its envelope.
pub struct CommandOutput {
    pub view: View,
    pub sources: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl CommandOutput {
    pub fn new(view: View, sources: Vec<ProviderId>) -> Self {
        Self {
            view,
            sources,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// An error message view whose envelope also carries the typed error.
    pub fn failure(error: &CoreError) -> Self {
        let mut output = Self::new(View::error(error.to_string()), Vec::new());
        output.errors.push(EnvelopeError::from(error));
        output
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn into_envelope(self, started: Instant) -> Result<Envelope<View>, CliError> {
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut meta = EnvelopeMeta::new(uuid::Uuid::new_v4().to_string(), self.sources, latency_ms)?;
        for warning in self.warnings {
            meta.push_warning(warning);
        }
        let mut envelope = Envelope::success(meta, self.view);
        for error in self.errors {
            envelope.push_error(error);
        }
        Ok(envelope)
    }
}

/// Runs a one-shot subcommand and renders it. In JSON mode a domain failure
/// is still printed as an envelope with `errors` set before it is returned.
pub async fn execute<W: Write>(
    cli: &Cli,
    services: &Services,
    out: &mut W,
) -> Result<(), CliError> {
    let started = Instant::now();
    let output = match run(cli, services).await {
        Ok(output) => output,
        Err(CliError::Core(error)) if cli.format == OutputFormat::Json => {
            let envelope = CommandOutput::failure(&error).into_envelope(started)?;
            output::render(out, &envelope, cli.format, cli.pretty)?;
            return Err(CliError::Core(error));
        }
        Err(other) => return Err(other),
    };
    let envelope = output.into_envelope(started)?;
    output::render(out, &envelope, cli.format, cli.pretty)
}

/// Runs a one-shot subcommand. `menu` is handled by the session instead.
pub async fn run(cli: &Cli, services: &Services) -> Result<CommandOutput, CliError> {
    let output = match &cli.command {
        None | Some(Command::Menu) => home(),
        Some(Command::Home) => home(),
        Some(Command::Predict(args)) => {
            predict(services, &args.symbol, args.days, args.intraday).await?
        }
        Some(Command::Price(args)) => price(services, &args.symbol).await?,
        Some(Command::News(args)) => news(services, &args.symbol).await?,
        Some(Command::Analyze(args)) => {
            let directory = services.load_directory()?;
            analyze(services, &directory, &args.company).await?
        }
        Some(Command::Companies(args)) => {
            let directory = services.load_directory()?;
            companies(&directory, args.query.as_deref())
        }
    };
    Ok(output)
}
