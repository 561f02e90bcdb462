use std::{future::Future, path::PathBuf, pin::Pin, sync::Arc};

use chrono::{TimeZone, Utc};
use error_stack::{report, Result, ResultExt};
use google_sheets4::oauth2::{
    self,
    authenticator::Authenticator,
    authenticator_delegate::InstalledFlowDelegate,
    storage::{TokenInfo, TokenStorage},
    ApplicationSecret, InstalledFlowReturnMethod,
};
use tokio::sync::Mutex;

use super::{
    credential::{Credential, SPREADSHEETS_READONLY_SCOPE},
    credential_manager::AuthorizationFlow,
    AuthenticationError,
};
use crate::sheets::http_client::{self, HttpsConnector};

type DelegateFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<String, String>> + Send + 'a>>;

/// Prints the consent URL and opens it in the system browser. The redirect
/// back to the local listener carries the code, so nothing is read from the
/// terminal.
struct BrowserConsent;

impl InstalledFlowDelegate for BrowserConsent {
    fn present_user_url<'a>(&'a self, url: &'a str, _need_code: bool) -> DelegateFuture<'a> {
        Box::pin(async move {
            eprintln!(
                "Please visit this URL to authorize this application: {}",
                url
            );
            open::that(url).map_err(|error| format!("Could not open a browser: {}", error))?;
            Ok(String::new())
        })
    }
}

/// Refuses interactive consent. Used while refreshing so that a rejected
/// refresh token fails instead of falling back to the browser.
struct NoConsent;

impl InstalledFlowDelegate for NoConsent {
    fn present_user_url<'a>(&'a self, _url: &'a str, _need_code: bool) -> DelegateFuture<'a> {
        Box::pin(async { Err("refresh token was rejected".to_string()) })
    }
}

/// Authenticator storage holding the single token of this run. The token
/// file itself is owned by the credential manager.
#[derive(Clone, Default)]
struct TokenSlot(Arc<Mutex<Option<TokenInfo>>>);

impl TokenSlot {
    fn holding(token: TokenInfo) -> Self {
        TokenSlot(Arc::new(Mutex::new(Some(token))))
    }

    async fn take(&self) -> Option<TokenInfo> {
        self.0.lock().await.take()
    }
}

#[async_trait::async_trait]
impl TokenStorage for TokenSlot {
    async fn set(&self, _scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        *self.0.lock().await = Some(token);
        Ok(())
    }

    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        self.0.lock().await.clone()
    }
}

/// Refresh is always forced, so the cached expiry is not carried over.
fn token_info(credential: &Credential) -> TokenInfo {
    TokenInfo {
        access_token: credential.token.clone(),
        refresh_token: credential.refresh_token.clone(),
        expires_at: None,
        id_token: None,
    }
}

fn credential_from_token(
    token: TokenInfo,
    secret: &ApplicationSecret,
    previous: Option<&Credential>,
) -> Credential {
    let expiry = token
        .expires_at
        .and_then(|at| Utc.timestamp_opt(at.unix_timestamp(), 0).single());

    Credential {
        token: token.access_token,
        refresh_token: token
            .refresh_token
            .or_else(|| previous.and_then(|previous| previous.refresh_token.clone())),
        token_uri: Some(secret.token_uri.clone()),
        client_id: Some(secret.client_id.clone()),
        client_secret: Some(secret.client_secret.clone()),
        scopes: vec![SPREADSHEETS_READONLY_SCOPE.to_string()],
        expiry,
    }
}

/// Google installed-app flow with a loopback redirect, driven by the
/// authenticator bundled with the Sheets client.
pub struct GoogleInstalledFlow {
    client_secret_path: PathBuf,
}

impl GoogleInstalledFlow {
    pub fn new(client_secret_path: impl Into<PathBuf>) -> Self {
        GoogleInstalledFlow {
            client_secret_path: client_secret_path.into(),
        }
    }

    async fn application_secret(&self) -> Result<ApplicationSecret, AuthenticationError> {
        oauth2::read_application_secret(&self.client_secret_path)
            .await
            .change_context(AuthenticationError::ClientSecretRead)
            .attach_printable_lazy(|| {
                format!("Client secret file: {}", self.client_secret_path.display())
            })
    }

    async fn authenticator(
        &self,
        secret: ApplicationSecret,
        storage: &TokenSlot,
        delegate: Box<dyn InstalledFlowDelegate>,
    ) -> Result<Authenticator<HttpsConnector>, AuthenticationError> {
        let client =
            http_client::http_client().change_context(AuthenticationError::Authenticator)?;

        oauth2::InstalledFlowAuthenticator::with_client(
            secret,
            InstalledFlowReturnMethod::HTTPRedirect,
            client,
        )
        .flow_delegate(delegate)
        .with_storage(Box::new(storage.clone()))
        .build()
        .await
        .change_context(AuthenticationError::Authenticator)
    }
}

#[async_trait::async_trait]
impl AuthorizationFlow for GoogleInstalledFlow {
    async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthenticationError> {
        let secret = self.application_secret().await?;
        let slot = TokenSlot::holding(token_info(credential));
        let authenticator = self
            .authenticator(secret.clone(), &slot, Box::new(NoConsent))
            .await?;

        authenticator
            .force_refreshed_token(&[SPREADSHEETS_READONLY_SCOPE])
            .await
            .change_context(AuthenticationError::RefreshFailed)?;

        let token = slot
            .take()
            .await
            .ok_or(report!(AuthenticationError::RefreshFailed))?;
        Ok(credential_from_token(token, &secret, Some(credential)))
    }

    async fn authorize(&self) -> Result<Credential, AuthenticationError> {
        let secret = self.application_secret().await?;
        let slot = TokenSlot::default();
        let authenticator = self
            .authenticator(secret.clone(), &slot, Box::new(BrowserConsent))
            .await?;

        log::info!("Waiting for consent in the browser");
        authenticator
            .token(&[SPREADSHEETS_READONLY_SCOPE])
            .await
            .change_context(AuthenticationError::ConsentFailed)?;

        let token = slot
            .take()
            .await
            .ok_or(report!(AuthenticationError::ConsentFailed))?;
        Ok(credential_from_token(token, &secret, None))
    }
}
