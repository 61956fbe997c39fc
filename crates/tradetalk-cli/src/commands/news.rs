use tradetalk_core::report::NewsReport;
use tradetalk_core::Symbol;

use crate::error::CliError;
use crate::output::View;

use super::{CommandOutput, Services};

/// An empty result is a successful view carrying an in-place warning.
pub async fn news(services: &Services, raw_symbol: &str) -> Result<CommandOutput, CliError> {
    let symbol = Symbol::parse(raw_symbol)?;
    let articles = services.news.fetch(&symbol).await?;

    Ok(CommandOutput::new(
        View::News(NewsReport::build(symbol, articles)),
        vec![services.news.id()],
    ))
}
