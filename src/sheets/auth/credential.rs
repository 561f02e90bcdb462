use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const SPREADSHEETS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly";

/// Tokens expiring within this window are treated as already expired.
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Authorized-user credential, stored as the JSON Google's client libraries
/// write for installed apps.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Credential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credential")
            .field("token", &redact(&self.token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Valid,
    ExpiredRefreshable,
    Invalid,
}

impl Credential {
    pub fn access_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|token| !token.is_empty())
    }

    /// A missing expiry never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .map_or(false, |expiry| expiry - Duration::seconds(EXPIRY_SKEW_SECONDS) <= now)
    }

    /// An empty scope list is taken to cover the requested scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.is_empty() || self.scopes.iter().any(|s| s == scope)
    }

    pub fn state(&self, now: DateTime<Utc>) -> CredentialState {
        if !self.has_scope(SPREADSHEETS_READONLY_SCOPE) {
            return CredentialState::Invalid;
        }

        let usable = self.access_token().is_some() && !self.is_expired(now);
        match (usable, self.refresh_token()) {
            (true, _) => CredentialState::Valid,
            (false, Some(_)) => CredentialState::ExpiredRefreshable,
            (false, None) => CredentialState::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn credential(expiry: Option<DateTime<Utc>>, refresh_token: Option<&str>) -> Credential {
        Credential {
            token: Some("ya29.access".to_string()),
            refresh_token: refresh_token.map(str::to_string),
            token_uri: Some("https://oauth2.googleapis.com/token".to_string()),
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            scopes: vec![SPREADSHEETS_READONLY_SCOPE.to_string()],
            expiry,
        }
    }

    #[test]
    fn test_valid_when_not_expired() {
        let c = credential(Some(now() + Duration::hours(1)), Some("1//refresh"));
        assert_eq!(c.state(now()), CredentialState::Valid);
    }

    #[test]
    fn test_valid_without_expiry() {
        let c = credential(None, None);
        assert_eq!(c.state(now()), CredentialState::Valid);
    }

    #[test]
    fn test_expired_with_refresh_token() {
        let c = credential(Some(now() - Duration::minutes(5)), Some("1//refresh"));
        assert_eq!(c.state(now()), CredentialState::ExpiredRefreshable);
    }

    #[test]
    fn test_about_to_expire_counts_as_expired() {
        let c = credential(Some(now() + Duration::seconds(30)), Some("1//refresh"));
        assert_eq!(c.state(now()), CredentialState::ExpiredRefreshable);
    }

    #[test]
    fn test_expired_without_refresh_token() {
        let c = credential(Some(now() - Duration::minutes(5)), None);
        assert_eq!(c.state(now()), CredentialState::Invalid);
    }

    #[test]
    fn test_missing_access_token_with_refresh_token() {
        let mut c = credential(None, Some("1//refresh"));
        c.token = None;
        assert_eq!(c.state(now()), CredentialState::ExpiredRefreshable);
    }

    #[test]
    fn test_wrong_scope_is_invalid() {
        let mut c = credential(Some(now() + Duration::hours(1)), Some("1//refresh"));
        c.scopes = vec!["https://www.googleapis.com/auth/drive".to_string()];
        assert_eq!(c.state(now()), CredentialState::Invalid);
    }

    #[test]
    fn test_parses_authorized_user_json() {
        let json = r#"{
            "token": "ya29.a0",
            "refresh_token": "1//0g",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "123.apps.googleusercontent.com",
            "client_secret": "GOCSPX",
            "scopes": ["https://www.googleapis.com/auth/spreadsheets.readonly"],
            "universe_domain": "googleapis.com",
            "account": "",
            "expiry": "2024-05-01T12:34:56.789012Z"
        }"#;

        let c: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(c.access_token(), Some("ya29.a0"));
        assert_eq!(c.refresh_token(), Some("1//0g"));
        let expected =
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap() + Duration::microseconds(789012);
        assert_eq!(c.expiry, Some(expected));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let c = credential(None, Some("1//refresh"));
        let debug = format!("{:?}", c);
        assert!(!debug.contains("ya29.access"));
        assert!(!debug.contains("1//refresh"));
    }
}
