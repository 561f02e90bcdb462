use chrono::{DateTime, Utc};
use error_stack::Result;

use super::{
    credential::{Credential, CredentialState},
    token_file::TokenFile,
    AuthenticationError,
};

/// The two ways of turning an unusable cached credential into a valid one.
#[async_trait::async_trait]
pub trait AuthorizationFlow: Send + Sync {
    async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthenticationError>;

    /// Interactive consent. Blocks until the user answers.
    async fn authorize(&self) -> Result<Credential, AuthenticationError>;
}

pub struct CredentialManager<F> {
    token_file: TokenFile,
    flow: F,
}

impl<F: AuthorizationFlow> CredentialManager<F> {
    pub fn new(token_file: TokenFile, flow: F) -> Self {
        CredentialManager { token_file, flow }
    }

    pub async fn obtain_credential(&self) -> Result<Credential, AuthenticationError> {
        self.obtain_credential_at(Utc::now()).await
    }

    /// A valid cached credential is returned untouched and the token file is
    /// not rewritten. Every refreshed or newly authorized credential is saved.
    pub async fn obtain_credential_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Credential, AuthenticationError> {
        log::debug!(
            "Looking for a cached credential in {}",
            self.token_file.path().display()
        );
        let credential = match self.token_file.load()? {
            Some(cached) => match cached.state(now) {
                CredentialState::Valid => {
                    log::debug!("Using cached credential");
                    return Ok(cached);
                }
                CredentialState::ExpiredRefreshable => {
                    log::info!("Cached credential expired, refreshing");
                    self.flow.refresh(&cached).await?
                }
                CredentialState::Invalid => {
                    log::info!("Cached credential is not usable, requesting consent");
                    self.flow.authorize().await?
                }
            },
            None => {
                log::info!("No cached credential, requesting consent");
                self.flow.authorize().await?
            }
        };

        self.token_file.save(&credential)?;
        Ok(credential)
    }
}
