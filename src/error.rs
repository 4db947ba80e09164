// ABOUTME: Crate-level error type with SNAFU pattern.
// ABOUTME: Unifies module errors and exposes an ErrorKind for programmatic handling.

use snafu::Snafu;

use crate::config::ConfigError;
use crate::engine::{EngineError, RegistryError};
use crate::normalize::NormalizeError;
use crate::translate::{TranslateError, ValidationError};

/// Unified error for inventory, translation, engine and config failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Registry { source: RegistryError },

    #[snafu(display("normalization failed: {source}"))]
    Normalize { source: NormalizeError },

    #[snafu(display("{source}"))]
    Translate { source: TranslateError },

    #[snafu(display("engine request failed: {source}"))]
    Engine { source: EngineError },

    #[snafu(display("{source}"))]
    Config { source: ConfigError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An engine id is already registered.
    Conflict,
    /// A native record carries a state string with no canonical counterpart.
    UnknownState,
    /// Create options violate an engine contract, including malformed port keys.
    Validation,
    /// The engine a record or request refers to is no longer registered.
    StaleEngine,
    /// A port reported by an engine could not be interpreted.
    InvalidPort,
    /// An env file could not be read.
    EnvFile,
    /// The engine daemon failed or could not be reached.
    Engine,
    /// Configuration could not be loaded.
    Config,
}

impl Error {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Registry { source } => match source {
                RegistryError::Conflict(_) => ErrorKind::Conflict,
                RegistryError::StaleEngine(_) => ErrorKind::StaleEngine,
            },
            Error::Normalize { source } => match source {
                NormalizeError::UnknownState { .. } => ErrorKind::UnknownState,
                NormalizeError::InvalidPort { .. } => ErrorKind::InvalidPort,
                NormalizeError::StaleEngine(_) => ErrorKind::StaleEngine,
            },
            Error::Translate { source } => match source {
                TranslateError::Validation(_) => ErrorKind::Validation,
                TranslateError::EnvFile { .. } => ErrorKind::EnvFile,
                TranslateError::StaleEngine(_) => ErrorKind::StaleEngine,
            },
            Error::Engine { .. } => ErrorKind::Engine,
            Error::Config { .. } => ErrorKind::Config,
        }
    }
}

impl From<RegistryError> for Error {
    fn from(source: RegistryError) -> Self {
        Error::Registry { source }
    }
}

impl From<NormalizeError> for Error {
    fn from(source: NormalizeError) -> Self {
        Error::Normalize { source }
    }
}

impl From<TranslateError> for Error {
    fn from(source: TranslateError) -> Self {
        Error::Translate { source }
    }
}

impl From<ValidationError> for Error {
    fn from(source: ValidationError) -> Self {
        Error::Translate {
            source: source.into(),
        }
    }
}

impl From<EngineError> for Error {
    fn from(source: EngineError) -> Self {
        Error::Engine { source }
    }
}

impl From<ConfigError> for Error {
    fn from(source: ConfigError) -> Self {
        Error::Config { source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
