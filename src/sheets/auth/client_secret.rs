use std::path::{Path, PathBuf};

use error_stack::{Result, ResultExt};
use serde::{Deserialize, Serialize};

use super::AuthenticationError;
use crate::config::oauth_env::OAuthClientEnv;

pub const PROJECT_ID: &str = "sheet2alias-auto";
pub const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const CERTS_URI: &str = "https://www.googleapis.com/oauth2/v1/certs";
pub const REDIRECT_URI: &str = "http://localhost";

/// Installed-app client secret, in the shape Google's console exports.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientSecretDescriptor {
    pub installed: InstalledApp,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct InstalledApp {
    pub client_id: String,
    pub project_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
}

impl std::fmt::Debug for InstalledApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledApp")
            .field("client_id", &self.client_id)
            .field("project_id", &self.project_id)
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .field("client_secret", &"<redacted>")
            .field("redirect_uris", &self.redirect_uris)
            .finish()
    }
}

impl ClientSecretDescriptor {
    pub fn from_env(env: &OAuthClientEnv) -> Self {
        ClientSecretDescriptor {
            installed: InstalledApp {
                client_id: env.client_id.clone(),
                project_id: PROJECT_ID.to_string(),
                auth_uri: AUTH_URI.to_string(),
                token_uri: TOKEN_URI.to_string(),
                auth_provider_x509_cert_url: CERTS_URI.to_string(),
                client_secret: env.client_secret.clone(),
                redirect_uris: vec![REDIRECT_URI.to_string()],
            },
        }
    }
}

/// The client secret serialized to disk for the lifetime of this value.
///
/// The file is removed when the guard drops, whether the run succeeded or
/// bailed out early with an error.
#[derive(Debug)]
pub struct ClientSecretFile {
    path: PathBuf,
}

impl ClientSecretFile {
    pub fn write(
        path: &Path,
        descriptor: &ClientSecretDescriptor,
    ) -> Result<Self, AuthenticationError> {
        let contents = serde_json::to_string(descriptor)
            .change_context(AuthenticationError::ClientSecretWrite)?;

        std::fs::write(path, contents)
            .change_context(AuthenticationError::ClientSecretWrite)
            .attach_printable_lazy(|| format!("Client secret file: {}", path.display()))?;

        log::debug!("Wrote client secret to {}", path.display());
        Ok(ClientSecretFile {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ClientSecretFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed client secret file {}", self.path.display()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => log::warn!(
                "Failed to remove client secret file {}: {}",
                self.path.display(),
                error
            ),
        }
    }
}
