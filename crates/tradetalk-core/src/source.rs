use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifies where the data in a rendered view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Yahoo Finance chart API.
    Yahoo,
    /// NewsAPI `everything` search.
    Newsapi,
    /// The bundled ticker directory spreadsheet.
    Directory,
    /// Deterministic offline data.
    Mock,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Newsapi => "newsapi",
            Self::Directory => "directory",
            Self::Mock => "mock",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
