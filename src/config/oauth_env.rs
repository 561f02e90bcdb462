use error_stack::{report, Result};
use thiserror::Error;

pub const CLIENT_ID_VAR: &str = "GOOGLE_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "GOOGLE_CLIENT_SECRET";

#[derive(Error, Debug)]
pub enum OAuthEnvError {
    #[error("Missing environment variable(s): {0}")]
    Missing(String),
}

/// OAuth client identity taken from the process environment.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthClientEnv {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for OAuthClientEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClientEnv")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl OAuthClientEnv {
    /// Both variables are checked before failing so the report names every
    /// missing one. Values are kept as given; blank ones count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OAuthEnvError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key).filter(|value| !value.trim().is_empty())
        };

        match (non_empty(CLIENT_ID_VAR), non_empty(CLIENT_SECRET_VAR)) {
            (Some(client_id), Some(client_secret)) => Ok(OAuthClientEnv {
                client_id,
                client_secret,
            }),
            (client_id, client_secret) => {
                let missing = [
                    (CLIENT_ID_VAR, client_id.is_none()),
                    (CLIENT_SECRET_VAR, client_secret.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, is_missing)| is_missing.then_some(name))
                .collect::<Vec<_>>()
                .join(", ");

                Err(report!(OAuthEnvError::Missing(missing)))
            }
        }
    }
}
