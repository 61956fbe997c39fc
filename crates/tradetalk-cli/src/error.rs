use thiserror::Error;
use tradetalk_core::{CoreError, ErrorKind, ValidationError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for CliError {
    fn from(error: ValidationError) -> Self {
        Self::Core(CoreError::from(error))
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Core(error) => match error.kind() {
                ErrorKind::InvalidInput => 2,
                ErrorKind::DataUnavailable
                | ErrorKind::ForecastFailed
                | ErrorKind::NewsUnavailable => 3,
                ErrorKind::InsufficientShares | ErrorKind::UnknownHolding => 4,
                ErrorKind::Configuration => 5,
                ErrorKind::Serialization => 6,
            },
            Self::Serialization(_) => 6,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(CliError::from(ValidationError::ZeroQuantity).exit_code(), 2);
        assert_eq!(
            CliError::from(CoreError::forecast_failed("singular")).exit_code(),
            3
        );
        assert_eq!(
            CliError::from(CoreError::UnknownHolding {
                symbol: String::from("AAPL")
            })
            .exit_code(),
            4
        );
        assert_eq!(
            CliError::from(CoreError::configuration("missing key")).exit_code(),
            5
        );
        assert_eq!(
            CliError::from(std::io::Error::other("closed")).exit_code(),
            10
        );
    }
}
