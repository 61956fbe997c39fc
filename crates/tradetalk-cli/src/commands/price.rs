use tradetalk_core::report::PriceReport;
use tradetalk_core::Symbol;

use crate::error::CliError;
use crate::output::View;

use super::{CommandOutput, Services};

pub async fn price(services: &Services, raw_symbol: &str) -> Result<CommandOutput, CliError> {
    let symbol = Symbol::parse(raw_symbol)?;
    let price = services.market.current_price(&symbol).await?;

    Ok(CommandOutput::new(
        View::Price(PriceReport { symbol, price }),
        vec![services.market.id()],
    ))
}
