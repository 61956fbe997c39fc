//! Company name to ticker mapping loaded once at startup.
//!
//! The first sheet of a workbook (or a headerless CSV) is read row by row:
//! column 0 holds the company name, column 1 the ticker symbol.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::config::DirectoryConfig;
use crate::{CoreError, Symbol, ValidationError};

/// Immutable name → symbol mapping, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerDirectory {
    entries: BTreeMap<String, Symbol>,
}

impl TickerDirectory {
    /// Loads the configured spreadsheet. Any unreadable, short, or malformed
    /// input is a configuration error.
    pub fn load(config: &DirectoryConfig) -> Result<Self, CoreError> {
        let rows = read_rows(&config.path, config.expected_rows)?;
        let directory = Self::from_rows(rows)?;
        tracing::info!(
            path = %config.path.display(),
            companies = directory.len(),
            "ticker directory loaded"
        );
        Ok(directory)
    }

    /// Builds a directory from `(name, symbol)` cell pairs. Row numbers in
    /// errors are one-based.
    pub fn from_rows<I, N, S>(rows: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for (index, (name, symbol)) in rows.into_iter().enumerate() {
            let row = index + 1;
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(CoreError::configuration(format!(
                    "ticker directory row {row}: company name is empty"
                )));
            }

            let symbol = Symbol::parse(symbol.as_ref()).map_err(|e| {
                CoreError::configuration(format!("ticker directory row {row}: {e}"))
            })?;

            if let Some(previous) = entries.insert(name.to_owned(), symbol) {
                tracing::warn!(
                    company = name,
                    replaced = %previous,
                    row,
                    "duplicate company name in ticker directory"
                );
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Symbol> {
        self.entries.iter()
    }

    /// Case-insensitive substring match over company names.
    pub fn find<'a>(&'a self, query: &str) -> Vec<(&'a str, &'a Symbol)> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|(name, _)| name.to_lowercase().contains(&needle))
            .map(|(name, symbol)| (name.as_str(), symbol))
            .collect()
    }

    /// Exact name first, then a unique substring match; otherwise says why
    /// nothing matched.
    pub fn resolve<'a>(&'a self, query: &str) -> Result<(&'a str, &'a Symbol), ValidationError> {
        if let Some((name, symbol)) = self.entries.get_key_value(query.trim()) {
            return Ok((name.as_str(), symbol));
        }

        let matches = self.find(query);
        match matches.as_slice() {
            [single] => Ok(*single),
            [] => Err(ValidationError::UnknownCompany {
                query: query.trim().to_owned(),
            }),
            _ => Err(ValidationError::AmbiguousCompany {
                query: query.trim().to_owned(),
                matches: matches.len(),
            }),
        }
    }
}

impl<'a> IntoIterator for &'a TickerDirectory {
    type Item = (&'a String, &'a Symbol);
    type IntoIter = btree_map::Iter<'a, String, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn read_rows(
    path: &Path,
    expected_rows: Option<usize>,
) -> Result<Vec<(String, String)>, CoreError> {
    if !path.exists() {
        return Err(CoreError::configuration(format!(
            "ticker directory '{}' does not exist",
            path.display()
        )));
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let rows = if is_csv {
        read_csv_rows(path, expected_rows)?
    } else {
        read_workbook_rows(path, expected_rows)?
    };

    if let Some(expected) = expected_rows {
        if rows.len() < expected {
            return Err(CoreError::configuration(format!(
                "ticker directory '{}' has {} rows, expected {expected}",
                path.display(),
                rows.len()
            )));
        }
    }

    Ok(rows)
}

fn read_workbook_rows(
    path: &Path,
    expected_rows: Option<usize>,
) -> Result<Vec<(String, String)>, CoreError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        CoreError::configuration(format!(
            "failed to open ticker directory '{}': {e}",
            path.display()
        ))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            CoreError::configuration(format!(
                "ticker directory '{}' has no worksheets",
                path.display()
            ))
        })?
        .map_err(|e| {
            CoreError::configuration(format!(
                "failed to read ticker directory '{}': {e}",
                path.display()
            ))
        })?;

    let limit = expected_rows.unwrap_or(usize::MAX);
    Ok(range
        .rows()
        .take(limit)
        .map(|row| (cell_text(row.first()), cell_text(row.get(1))))
        .collect())
}

fn read_csv_rows(
    path: &Path,
    expected_rows: Option<usize>,
) -> Result<Vec<(String, String)>, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            CoreError::configuration(format!(
                "failed to open ticker directory '{}': {e}",
                path.display()
            ))
        })?;

    let limit = expected_rows.unwrap_or(usize::MAX);
    let mut rows = Vec::new();
    for record in reader.records().take(limit) {
        let record = record.map_err(|e| {
            CoreError::configuration(format!(
                "failed to read ticker directory '{}': {e}",
                path.display()
            ))
        })?;
        rows.push((
            record.get(0).unwrap_or_default().to_owned(),
            record.get(1).unwrap_or_default().to_owned(),
        ));
    }
    Ok(rows)
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(value)) => value.clone(),
        Some(other) => other.to_string(),
    }
}
