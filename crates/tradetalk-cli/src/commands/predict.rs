use tradetalk_core::report::PredictionReport;
use tradetalk_core::{ForecastEngine, HistorySpan, Horizon, Interval, Symbol};

use crate::error::CliError;
use crate::output::View;

use super::{CommandOutput, Services};

/// Fits on the configured daily window, or today's one-minute bars when
/// `intraday` is set, then prices the symbol for the current-price overlay.
pub async fn predict(
    services: &Services,
    raw_symbol: &str,
    days: i64,
    intraday: bool,
) -> Result<CommandOutput, CliError> {
    let symbol = Symbol::parse(raw_symbol)?;
    let horizon = Horizon::new(days)?;

    let (span, interval) = if intraday {
        (HistorySpan::ONE_DAY, Interval::OneMinute)
    } else {
        (services.config.prediction_span(), Interval::OneDay)
    };

    let series = services.market.history(&symbol, span, interval).await?;
    let forecast = ForecastEngine::default().forecast(&series, horizon)?;
    let current_price = services.market.current_price(&symbol).await?;

    tracing::info!(symbol = %symbol, horizon = horizon.get(), intraday, "prediction ready");
    let report = PredictionReport::build(&series, forecast, current_price, intraday);
    Ok(CommandOutput::new(
        View::Prediction(report),
        vec![services.market.id()],
    ))
}
