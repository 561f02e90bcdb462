use error_stack::Context;
use thiserror::Error;

use crate::{
    alias::alias_writer::AliasWriterError,
    config::{app_config::ConfigError, oauth_env::OAuthEnvError},
    sheets::{auth::AuthenticationError, spreadsheet_manager::SpreadsheetManagerError},
};

/// Failure taxonomy of a run. Every kind is fatal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineError {
    #[error("Configuration error")]
    Configuration,
    #[error("Environment error")]
    Environment,
    #[error("Authentication error")]
    Authentication,
    #[error("Spreadsheet not found")]
    NotFound,
    #[error("Authorization error")]
    Authorization,
    #[error("Network error")]
    Network,
    #[error("Filesystem error")]
    Filesystem,
    #[error("Interrupted")]
    Interrupted,
}

impl From<&ConfigError> for RoutineError {
    fn from(_: &ConfigError) -> Self {
        RoutineError::Configuration
    }
}

impl From<&OAuthEnvError> for RoutineError {
    fn from(_: &OAuthEnvError) -> Self {
        RoutineError::Environment
    }
}

impl From<&AuthenticationError> for RoutineError {
    fn from(error: &AuthenticationError) -> Self {
        match error {
            AuthenticationError::ClientSecretWrite | AuthenticationError::TokenFileWrite => {
                RoutineError::Filesystem
            }
            _ => RoutineError::Authentication,
        }
    }
}

impl From<&SpreadsheetManagerError> for RoutineError {
    fn from(error: &SpreadsheetManagerError) -> Self {
        match error {
            SpreadsheetManagerError::SpreadsheetNotFound
            | SpreadsheetManagerError::NoWorksheets => RoutineError::NotFound,
            SpreadsheetManagerError::InsufficientScope
            | SpreadsheetManagerError::Unauthorized => RoutineError::Authorization,
            SpreadsheetManagerError::FailedToFetchSheetTitle
            | SpreadsheetManagerError::FailedToFetchRange
            | SpreadsheetManagerError::HttpClient => RoutineError::Network,
        }
    }
}

impl From<&AliasWriterError> for RoutineError {
    fn from(_: &AliasWriterError) -> Self {
        RoutineError::Filesystem
    }
}

/// Re-labels a stage report with its [`RoutineError`] kind, keeping the
/// stage's own context underneath.
pub trait ClassifyReport<T> {
    fn classify(self) -> error_stack::Result<T, RoutineError>;
}

impl<T, C> ClassifyReport<T> for error_stack::Result<T, C>
where
    C: Context,
    for<'a> &'a C: Into<RoutineError>,
{
    fn classify(self) -> error_stack::Result<T, RoutineError> {
        self.map_err(|report| {
            let kind: RoutineError = report.current_context().into();
            report.change_context(kind)
        })
    }
}

#[async_trait::async_trait]
pub trait Routine: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> error_stack::Result<(), RoutineError>;
}

#[cfg(test)]
mod tests {
    use error_stack::report;

    use super::*;

    #[test]
    fn test_classify_keeps_stage_context() {
        let result: error_stack::Result<(), ConfigError> =
            Err(report!(ConfigError::MissingProperty("google.cell")));

        let report = result.classify().unwrap_err();
        assert_eq!(report.current_context(), &RoutineError::Configuration);
        assert!(report.contains::<ConfigError>());
    }

    #[test]
    fn test_authentication_mapping() {
        assert_eq!(
            RoutineError::from(&AuthenticationError::CorruptTokenFile),
            RoutineError::Authentication
        );
        assert_eq!(
            RoutineError::from(&AuthenticationError::TokenFileWrite),
            RoutineError::Filesystem
        );
    }

    #[test]
    fn test_spreadsheet_mapping() {
        assert_eq!(
            RoutineError::from(&SpreadsheetManagerError::SpreadsheetNotFound),
            RoutineError::NotFound
        );
        assert_eq!(
            RoutineError::from(&SpreadsheetManagerError::InsufficientScope),
            RoutineError::Authorization
        );
        assert_eq!(
            RoutineError::from(&SpreadsheetManagerError::FailedToFetchRange),
            RoutineError::Network
        );
    }
}
