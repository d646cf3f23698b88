//! OAuth 2.0 authorization-code flow for Google and GitHub.
//!
//! The flow: [`authorize_url`] sends the browser to the provider with a random
//! `state`, the provider redirects back with a `code`, [`exchange_code`] trades
//! it for an access token and [`fetch_profile`] reads the user's identity.

use std::fmt;
use std::str::FromStr;

use qt_core::account::normalize_email;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Url;
use serde::Deserialize;

const GITHUB_API_USER_AGENT: &str = "qt-api";

/// Supported identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

/// Static endpoints and scopes of a provider.
struct ProviderEndpoints {
    authorize: &'static str,
    token: &'static str,
    profile: &'static str,
    scope: &'static str,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }

    fn endpoints(self) -> ProviderEndpoints {
        match self {
            OAuthProvider::Google => ProviderEndpoints {
                authorize: "https://accounts.google.com/o/oauth2/v2/auth",
                token: "https://oauth2.googleapis.com/token",
                profile: "https://openidconnect.googleapis.com/v1/userinfo",
                scope: "openid email profile",
            },
            OAuthProvider::Github => ProviderEndpoints {
                authorize: "https://github.com/login/oauth/authorize",
                token: "https://github.com/login/oauth/access_token",
                profile: "https://api.github.com/user",
                scope: "read:user user:email",
            },
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            other => Err(OAuthError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Unknown OAuth provider '{0}'")]
    UnknownProvider(String),

    #[error("OAuth provider '{0}' is not configured")]
    NotConfigured(OAuthProvider),

    #[error("OAuth request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OAuth token exchange failed: {0}")]
    TokenExchange(String),

    #[error("OAuth provider returned no usable email address")]
    MissingEmail,

    #[error("Invalid OAuth URL: {0}")]
    InvalidUrl(String),
}

/// Client credentials for one provider.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// OAuth client configuration. A provider is enabled when both its client id
/// and secret are set.
#[derive(Debug, Clone, Default)]
pub struct OAuthConfig {
    pub google: Option<ProviderCredentials>,
    pub github: Option<ProviderCredentials>,
}

impl OAuthConfig {
    /// Load credentials from `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` and
    /// `GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET`.
    pub fn from_env() -> Self {
        Self {
            google: credentials_from_env("GOOGLE"),
            github: credentials_from_env("GITHUB"),
        }
    }

    pub fn credentials(&self, provider: OAuthProvider) -> Result<&ProviderCredentials, OAuthError> {
        let creds = match provider {
            OAuthProvider::Google => self.google.as_ref(),
            OAuthProvider::Github => self.github.as_ref(),
        };
        creds.ok_or(OAuthError::NotConfigured(provider))
    }
}

fn credentials_from_env(prefix: &str) -> Option<ProviderCredentials> {
    let client_id = std::env::var(format!("{prefix}_CLIENT_ID")).ok()?;
    let client_secret = std::env::var(format!("{prefix}_CLIENT_SECRET")).ok()?;
    if client_id.is_empty() || client_secret.is_empty() {
        return None;
    }
    Some(ProviderCredentials {
        client_id,
        client_secret,
    })
}

/// Identity returned by a provider, normalized across providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub provider: OAuthProvider,
    /// Stable provider-side user id.
    pub provider_account_id: String,
    /// Normalized (lower-case) email address.
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Build the provider authorization URL the browser is redirected to.
pub fn authorize_url(
    provider: OAuthProvider,
    creds: &ProviderCredentials,
    redirect_uri: &str,
    state: &str,
) -> Result<String, OAuthError> {
    let endpoints = provider.endpoints();
    let mut params = vec![
        ("client_id", creds.client_id.as_str()),
        ("redirect_uri", redirect_uri),
        ("scope", endpoints.scope),
        ("state", state),
    ];
    if provider == OAuthProvider::Google {
        params.push(("response_type", "code"));
        params.push(("prompt", "select_account"));
    }
    let url = Url::parse_with_params(endpoints.authorize, &params)
        .map_err(|e| OAuthError::InvalidUrl(e.to_string()))?;
    Ok(url.into())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchange an authorization code for a provider access token.
pub async fn exchange_code(
    http: &reqwest::Client,
    provider: OAuthProvider,
    creds: &ProviderCredentials,
    redirect_uri: &str,
    code: &str,
) -> Result<String, OAuthError> {
    let response: TokenResponse = http
        .post(provider.endpoints().token)
        .header(ACCEPT, "application/json")
        .form(&[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?
        .json()
        .await?;

    match response {
        TokenResponse {
            access_token: Some(token),
            ..
        } => Ok(token),
        TokenResponse {
            error,
            error_description,
            ..
        } => Err(OAuthError::TokenExchange(
            error_description
                .or(error)
                .unwrap_or_else(|| "no access token in response".into()),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubEmail {
    pub email: String,
    pub primary: bool,
    pub verified: bool,
}

/// The primary verified address from GitHub's `/user/emails`.
pub fn select_github_email(emails: &[GithubEmail]) -> Option<&str> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email.as_str())
}

/// Fetch the signed-in user's profile with a provider access token.
pub async fn fetch_profile(
    http: &reqwest::Client,
    provider: OAuthProvider,
    access_token: &str,
) -> Result<OAuthProfile, OAuthError> {
    match provider {
        OAuthProvider::Google => {
            let info: GoogleUserInfo = http
                .get(provider.endpoints().profile)
                .bearer_auth(access_token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            let email = info.email.ok_or(OAuthError::MissingEmail)?;
            Ok(OAuthProfile {
                provider,
                provider_account_id: info.sub,
                email: normalize_email(&email),
                email_verified: info.email_verified,
                name: info.name,
                image: info.picture,
            })
        }
        OAuthProvider::Github => {
            let user: GithubUser = github_get(http, provider.endpoints().profile, access_token)
                .await?
                .json()
                .await?;

            // A public GitHub email is always verified; otherwise ask for the
            // primary verified address.
            let email = match user.email {
                Some(email) => email,
                None => {
                    let emails: Vec<GithubEmail> =
                        github_get(http, "https://api.github.com/user/emails", access_token)
                            .await?
                            .json()
                            .await?;
                    select_github_email(&emails)
                        .map(str::to_string)
                        .ok_or(OAuthError::MissingEmail)?
                }
            };

            Ok(OAuthProfile {
                provider,
                provider_account_id: user.id.to_string(),
                email: normalize_email(&email),
                email_verified: true,
                name: user.name.or(Some(user.login)),
                image: user.avatar_url,
            })
        }
    }
}

async fn github_get(
    http: &reqwest::Client,
    url: &str,
    access_token: &str,
) -> Result<reqwest::Response, OAuthError> {
    Ok(http
        .get(url)
        .bearer_auth(access_token)
        .header(USER_AGENT, GITHUB_API_USER_AGENT)
        .header(ACCEPT, "application/vnd.github+json")
        .send()
        .await?
        .error_for_status()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn creds() -> ProviderCredentials {
        ProviderCredentials {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
        }
    }

    #[test]
    fn parses_provider_names() {
        assert_eq!("google".parse::<OAuthProvider>().unwrap(), OAuthProvider::Google);
        assert_eq!("github".parse::<OAuthProvider>().unwrap(), OAuthProvider::Github);
        assert_matches!(
            "facebook".parse::<OAuthProvider>(),
            Err(OAuthError::UnknownProvider(_))
        );
    }

    #[test]
    fn google_authorize_url_carries_code_flow_params() {
        let url = authorize_url(
            OAuthProvider::Google,
            &creds(),
            "http://localhost:3000/api/v1/auth/oauth/google/callback",
            "st4te",
        )
        .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(pairs.contains(&("client_id".into(), "client-123".into())));
        assert!(pairs.contains(&("state".into(), "st4te".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:3000/api/v1/auth/oauth/google/callback".into()
        )));
        // The secret never leaves the server in a redirect.
        assert!(!url.contains("secret"));
    }

    #[test]
    fn github_authorize_url_requests_email_scope() {
        let url = authorize_url(OAuthProvider::Github, &creds(), "http://x/cb", "s").unwrap();
        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("scope=read%3Auser+user%3Aemail"));
    }

    #[test]
    fn missing_credentials_disable_provider() {
        let config = OAuthConfig {
            google: Some(creds()),
            github: None,
        };
        assert!(config.credentials(OAuthProvider::Google).is_ok());
        assert_matches!(
            config.credentials(OAuthProvider::Github),
            Err(OAuthError::NotConfigured(OAuthProvider::Github))
        );
    }

    #[test]
    fn github_email_fallback_picks_primary_verified() {
        let emails = vec![
            GithubEmail {
                email: "old@example.com".into(),
                primary: false,
                verified: true,
            },
            GithubEmail {
                email: "main@example.com".into(),
                primary: true,
                verified: true,
            },
        ];
        assert_eq!(select_github_email(&emails), Some("main@example.com"));

        let unverified = vec![GithubEmail {
            email: "main@example.com".into(),
            primary: true,
            verified: false,
        }];
        assert_eq!(select_github_email(&unverified), None);
    }
}
