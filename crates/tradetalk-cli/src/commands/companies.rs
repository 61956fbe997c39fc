use tradetalk_core::{ProviderId, TickerDirectory};

use crate::output::{CompaniesView, CompanyEntry, View};

use super::CommandOutput;

pub fn companies(directory: &TickerDirectory, query: Option<&str>) -> CommandOutput {
    let entries = match query {
        Some(query) => directory
            .find(query)
            .into_iter()
            .map(|(name, symbol)| CompanyEntry::new(name, symbol))
            .collect(),
        None => directory
            .iter()
            .map(|(name, symbol)| CompanyEntry::new(name, symbol))
            .collect(),
    };

    CommandOutput::new(
        View::Companies(CompaniesView { entries }),
        vec![ProviderId::Directory],
    )
}
