use crate::config::GoogleSettings;
use crate::domain::service::{GoogleIdentity, IdentityProvider};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use oauth2::basic::{
    BasicClient, BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenResponse,
};
use oauth2::url::Url;
use oauth2::{
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, Scope, StandardRevocableToken, TokenResponse, TokenUrl,
};
use serde::Deserialize;

pub type GoogleClient = Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKEN_INFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const USER_INFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

pub fn create_google_oauth_client(
    client_id: &str,
    client_secret: &str,
    redirect_url: &str,
) -> anyhow::Result<GoogleClient> {
    let client = BasicClient::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_uri(AuthUrl::new(AUTH_URL.to_string())?)
        .set_token_uri(TokenUrl::new(TOKEN_URL.to_string())?)
        .set_redirect_uri(RedirectUrl::new(redirect_url.to_string())?);
    Ok(client)
}

/// Claims returned by the token info endpoint for a valid ID token.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

/// Google sign-in: ID token verification and the authorization code flow.
pub struct GoogleOAuth {
    client_id: Option<String>,
    client: Option<GoogleClient>,
    http: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(settings: &GoogleSettings) -> anyhow::Result<GoogleOAuth> {
        let client = match (
            settings.client_id.as_deref(),
            settings.client_secret.as_deref(),
            settings.redirect_url.as_deref(),
        ) {
            (Some(id), Some(secret), Some(redirect)) => {
                Some(create_google_oauth_client(id, secret, redirect)?)
            }
            _ => None,
        };

        // token endpoints must not follow redirects
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(GoogleOAuth {
            client_id: settings.client_id.clone(),
            client,
            http,
        })
    }

    fn client(&self) -> anyhow::Result<&GoogleClient> {
        self.client
            .as_ref()
            .ok_or_else(|| anyhow!("Google OAuth client is not configured"))
    }

    /// Consent page URL and the CSRF state the callback must echo back.
    pub fn authorize_url(&self) -> anyhow::Result<(Url, CsrfToken)> {
        let (url, state) = self
            .client()?
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .url();
        Ok((url, state))
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    async fn verify_id_token(&self, id_token: &str) -> anyhow::Result<GoogleIdentity> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| anyhow!("GOOGLE_CLIENT_ID is not configured"))?;

        let info: TokenInfo = self
            .http
            .get(TOKEN_INFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if info.aud != client_id {
            bail!("ID token was issued for another client");
        }
        let email = info
            .email
            .ok_or_else(|| anyhow!("ID token carries no email"))?;

        Ok(GoogleIdentity {
            subject: info.sub,
            email,
            name: info.name,
        })
    }

    async fn exchange_code(&self, code: &str) -> anyhow::Result<GoogleIdentity> {
        let token = self
            .client()?
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await?;

        let info: UserInfo = self
            .http
            .get(USER_INFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = info
            .email
            .ok_or_else(|| anyhow!("Google account has no email"))?;

        Ok(GoogleIdentity {
            subject: info.sub,
            email,
            name: info.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GoogleSettings {
        GoogleSettings {
            client_id: Some("client-id.apps.googleusercontent.com".to_string()),
            client_secret: Some("client-secret".to_string()),
            redirect_url: Some("http://localhost:8080/auth/google/callback".to_string()),
        }
    }

    #[test]
    fn authorize_url_carries_client_and_state() {
        let google = GoogleOAuth::new(&settings()).unwrap();
        let (url, state) = google.authorize_url().unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(
            get("client_id").as_deref(),
            Some("client-id.apps.googleusercontent.com")
        );
        assert_eq!(get("state").as_deref(), Some(state.secret().as_str()));
        assert_eq!(get("scope").as_deref(), Some("openid email profile"));
    }

    #[test]
    fn code_flow_needs_full_settings() {
        let google = GoogleOAuth::new(&GoogleSettings {
            client_id: Some("id".to_string()),
            client_secret: None,
            redirect_url: None,
        })
        .unwrap();
        assert!(google.authorize_url().is_err());
    }
}
