//! OAuth2 installed-app credentials for the Sheets API.

pub mod client_secret;
pub mod credential;
pub mod credential_manager;
mod installed_flow;
pub mod token_file;

use error_stack::Result;
use thiserror::Error;

use self::{
    client_secret::ClientSecretFile, credential::Credential,
    credential_manager::CredentialManager, installed_flow::GoogleInstalledFlow,
    token_file::TokenFile,
};
use crate::config::app_config::Settings;

#[derive(Error, Debug)]
pub enum AuthenticationError {
    #[error("Failed to write client secret file")]
    ClientSecretWrite,
    #[error("Failed to read client secret file")]
    ClientSecretRead,
    #[error("Token file is corrupt or unreadable")]
    CorruptTokenFile,
    #[error("Failed to save token file")]
    TokenFileWrite,
    #[error("Failed to set up the OAuth authenticator")]
    Authenticator,
    #[error("Failed to refresh access token")]
    RefreshFailed,
    #[error("Interactive authorization did not complete")]
    ConsentFailed,
}

/// Loads, refreshes or creates the credential cached at the configured token
/// file. `client_secret` must stay alive until this returns since the consent
/// flow reads the client identity from it.
pub async fn obtain_credential(
    settings: &Settings,
    client_secret: &ClientSecretFile,
) -> Result<Credential, AuthenticationError> {
    let flow = GoogleInstalledFlow::new(client_secret.path());
    CredentialManager::new(TokenFile::new(&settings.token_file_path), flow)
        .obtain_credential()
        .await
}
