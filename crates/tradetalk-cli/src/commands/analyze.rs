use tradetalk_core::report::AnalysisReport;
use tradetalk_core::{CoreError, HistorySpan, Interval, ProviderId, TickerDirectory};

use crate::error::CliError;
use crate::output::View;

use super::{CommandOutput, Services};

/// Ten years of daily closes for a company picked from the directory.
pub async fn analyze(
    services: &Services,
    directory: &TickerDirectory,
    company_query: &str,
) -> Result<CommandOutput, CliError> {
    let (company, symbol) = directory.resolve(company_query)?;

    let series = services
        .market
        .history(symbol, HistorySpan::TEN_YEARS, Interval::OneDay)
        .await?;
    let report = AnalysisReport::build(Some(company), &series)
        .ok_or_else(|| CoreError::data_unavailable(symbol, "provider returned no rows"))?;

    Ok(CommandOutput::new(
        View::Analysis(report),
        vec![ProviderId::Directory, services.market.id()],
    ))
}
