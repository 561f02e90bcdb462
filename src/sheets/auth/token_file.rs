use std::path::{Path, PathBuf};

use error_stack::{Result, ResultExt};

use super::{credential::Credential, AuthenticationError};

/// On-disk cache of the authorized-user credential.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when there is no token file yet.
    pub fn load(&self) -> Result<Option<Credential>, AuthenticationError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No cached token at {}", self.path.display());
                return Ok(None);
            }
            Err(error) => {
                return Err(error)
                    .change_context(AuthenticationError::CorruptTokenFile)
                    .attach_printable_lazy(|| format!("Token file: {}", self.path.display()));
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .change_context(AuthenticationError::CorruptTokenFile)
            .attach_printable_lazy(|| format!("Token file: {}", self.path.display()))
    }

    pub fn save(&self, credential: &Credential) -> Result<(), AuthenticationError> {
        let contents = serde_json::to_string_pretty(credential)
            .change_context(AuthenticationError::TokenFileWrite)?;

        std::fs::write(&self.path, contents)
            .change_context(AuthenticationError::TokenFileWrite)
            .attach_printable_lazy(|| format!("Token file: {}", self.path.display()))?;

        log::debug!("Saved credential to {}", self.path.display());
        Ok(())
    }
}
