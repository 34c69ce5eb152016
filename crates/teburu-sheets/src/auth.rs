//! Request credentials
//!
//! Supports an API key (public sheets), a static bearer token, and OAuth
//! "authorized_user" credential files whose refresh token is exchanged for
//! short-lived access tokens.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{SheetsError, SheetsResult};

/// Default OAuth token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// How requests to the Sheets API are authorized
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    /// Anonymous requests
    #[default]
    None,
    /// API key sent as the `key` query parameter
    ApiKey(String),
    /// Pre-issued OAuth access token sent as a bearer token
    AccessToken(String),
    /// OAuth client with a refresh token
    AuthorizedUser(AuthorizedUser),
}

/// Contents of an `authorized_user` credentials file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CredentialsFile {
    AuthorizedUser(AuthorizedUser),
    ServiceAccount {},
}

impl Credentials {
    /// Load credentials from a JSON credentials file
    pub fn from_file(path: impl AsRef<Path>) -> SheetsResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)?;
        Self::from_json(&raw).map_err(|e| match e {
            SheetsError::Credentials(msg) => {
                SheetsError::Credentials(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse a credentials file body
    pub fn from_json(raw: &[u8]) -> SheetsResult<Self> {
        let file: CredentialsFile = serde_json::from_slice(raw)
            .map_err(|e| SheetsError::Credentials(e.to_string()))?;

        match file {
            CredentialsFile::AuthorizedUser(user) => Ok(Credentials::AuthorizedUser(user)),
            CredentialsFile::ServiceAccount {} => Err(SheetsError::Credentials(
                "service_account credentials are not supported; use an authorized_user file, \
                 an access token or an API key"
                    .to_string(),
            )),
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::None => "none",
            Credentials::ApiKey(_) => "api_key",
            Credentials::AccessToken(_) => "access_token",
            Credentials::AuthorizedUser(_) => "authorized_user",
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Credentials plus the cached access token for refresh-token flows
#[derive(Debug)]
pub struct Authenticator {
    credentials: Credentials,
    cached: Mutex<Option<CachedToken>>,
}

impl Authenticator {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            cached: Mutex::new(None),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// API key to append to request URLs, if any
    pub fn api_key(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::ApiKey(key) => Some(key),
            _ => None,
        }
    }

    /// Bearer token for the next request, refreshing it when needed
    pub async fn bearer_token(&self, client: &reqwest::Client) -> SheetsResult<Option<String>> {
        match &self.credentials {
            Credentials::AccessToken(token) => Ok(Some(token.clone())),
            Credentials::AuthorizedUser(user) => self.refreshed_token(client, user).await.map(Some),
            Credentials::None | Credentials::ApiKey(_) => Ok(None),
        }
    }

    async fn refreshed_token(
        &self,
        client: &reqwest::Client,
        user: &AuthorizedUser,
    ) -> SheetsResult<String> {
        // Held across the exchange so concurrent requests share one refresh
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!(token_uri = %user.token_uri, "refreshing access token");
        let response = client
            .post(&user.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
                ("refresh_token", user.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(SheetsError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(&body).trim()
            )));
        }

        let token: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| SheetsError::Auth(format!("invalid token response: {}", e)))?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));

        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        });

        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorized_user_file() {
        let raw = br#"{
            "type": "authorized_user",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "secret",
            "refresh_token": "1//refresh"
        }"#;
        let creds = Credentials::from_json(raw).unwrap();
        match creds {
            Credentials::AuthorizedUser(user) => {
                assert_eq!(user.refresh_token, "1//refresh");
                assert_eq!(user.token_uri, DEFAULT_TOKEN_URI);
            }
            other => panic!("unexpected credentials: {:?}", other),
        }
    }

    #[test]
    fn test_service_account_rejected() {
        let raw = br#"{"type": "service_account", "private_key": "-----BEGIN"}"#;
        let err = Credentials::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("service_account"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(matches!(
            Credentials::from_json(br#"{"type": "external_account"}"#),
            Err(SheetsError::Credentials(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("teburu-no-such-creds.json");
        assert!(matches!(Credentials::from_file(&path), Err(SheetsError::Io(_))));
    }

    #[tokio::test]
    async fn test_static_tokens() {
        let client = reqwest::Client::new();

        let auth = Authenticator::new(Credentials::AccessToken("tok".into()));
        assert_eq!(auth.bearer_token(&client).await.unwrap(), Some("tok".to_string()));
        assert_eq!(auth.api_key(), None);

        let auth = Authenticator::new(Credentials::ApiKey("key".into()));
        assert_eq!(auth.bearer_token(&client).await.unwrap(), None);
        assert_eq!(auth.api_key(), Some("key"));
    }
}
