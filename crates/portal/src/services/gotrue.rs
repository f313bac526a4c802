//! HTTP client for a GoTrue-compatible identity service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use domain::models::{AuthUser, Session};
use domain::services::identity::{
    IdentityProvider, ProviderAuthResponse, ProviderError, SignUpParams,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::IdentityConfig;

/// Token response returned by `/token` and by `/signup` when no
/// confirmation is required.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(|| now + chrono::Duration::seconds(self.expires_in.unwrap_or(3600)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Error body. Newer services send `error_code`/`msg`, older ones
/// `error`/`error_description`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn parse_error(status: u16, body: &str) -> ProviderError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    ProviderError {
        status: Some(status),
        code: parsed.error_code.or(parsed.error),
        message: parsed
            .msg
            .or(parsed.error_description)
            .or(parsed.message)
            .unwrap_or_else(|| format!("HTTP {}", status)),
    }
}

/// A sign-up response is either a token response or a bare user object.
fn parse_sign_up(body: Value, now: DateTime<Utc>) -> Result<ProviderAuthResponse, ProviderError> {
    let invalid = |e: serde_json::Error| ProviderError::network(format!("Invalid response: {}", e));

    if body.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(body).map_err(invalid)?;
        let session = token.into_session(now);
        return Ok(ProviderAuthResponse {
            user: session.user.clone(),
            session: Some(session),
        });
    }

    let user_value = body.get("user").cloned().unwrap_or(body);
    let user: AuthUser = serde_json::from_value(user_value).map_err(invalid)?;
    Ok(ProviderAuthResponse {
        user,
        session: None,
    })
}

/// Identity provider backed by GoTrue REST endpoints.
#[derive(Clone)]
pub struct GoTrueClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    /// Create a client. Every request is bounded by the configured timeout.
    pub fn new(config: &IdentityConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(config.request_timeout_secs.min(10)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_redirect(&self, path: &str, redirect_to: Option<&str>) -> String {
        match redirect_to {
            Some(redirect) => {
                let encoded: String = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("redirect_to", redirect)
                    .finish();
                format!("{}?{}", self.endpoint(path), encoded)
            }
            None => self.endpoint(path),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let response = request
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network("Request to identity provider timed out")
                } else {
                    ProviderError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, "Identity provider returned an error");
            return Err(parse_error(status.as_u16(), &body));
        }

        Ok(response)
    }

    async fn json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ProviderError> {
        response
            .json()
            .await
            .map_err(|e| ProviderError::network(format!("Invalid response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_up(&self, params: SignUpParams) -> Result<ProviderAuthResponse, ProviderError> {
        let url = self.with_redirect("/signup", params.email_redirect_to.as_deref());
        let body = json!({
            "email": params.email,
            "password": params.password,
            "data": params.metadata,
        });
        let response = self.send(self.client.post(url).json(&body)).await?;
        let value: Value = Self::json(response).await?;
        parse_sign_up(value, Utc::now())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let url = self.endpoint("/token?grant_type=password");
        let body = json!({ "email": email, "password": password });
        let response = self.send(self.client.post(url).json(&body)).await?;
        let token: TokenResponse = Self::json(response).await?;
        Ok(token.into_session(Utc::now()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let url = self.endpoint("/logout");
        self.send(self.client.post(url).bearer_auth(access_token))
            .await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ProviderError> {
        let url = self.endpoint("/user");
        let response = self
            .send(self.client.get(url).bearer_auth(access_token))
            .await?;
        Self::json(response).await
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ProviderError> {
        let url = self.with_redirect("/recover", redirect_to);
        self.send(self.client.post(url).json(&json!({ "email": email })))
            .await?;
        Ok(())
    }

    async fn update_user_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError> {
        let url = self.endpoint("/user");
        let response = self
            .send(
                self.client
                    .put(url)
                    .bearer_auth(access_token)
                    .json(&json!({ "password": password })),
            )
            .await?;
        Self::json(response).await
    }

    async fn resend_signup(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ProviderError> {
        let url = self.with_redirect("/resend", redirect_to);
        let body = json!({ "type": "signup", "email": email });
        self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn config() -> IdentityConfig {
        IdentityConfig {
            url: "https://auth.example.com/auth/v1/".to_string(),
            anon_key: "anon".to_string(),
            redirect_url: None,
            reset_redirect_url: None,
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_parse_error_new_format() {
        let err = parse_error(
            400,
            r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        );
        assert_eq!(err.status, Some(400));
        assert_eq!(err.code.as_deref(), Some("invalid_credentials"));
        assert_eq!(err.message, "Invalid login credentials");
    }

    #[test]
    fn test_parse_error_legacy_format() {
        let err = parse_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err.code.as_deref(), Some("invalid_grant"));
        assert_eq!(err.message, "Invalid login credentials");
    }

    #[test]
    fn test_parse_error_unparseable_body() {
        let err = parse_error(502, "<html>Bad Gateway</html>");
        assert_eq!(err.code, None);
        assert_eq!(err.message, "HTTP 502");
    }

    #[test]
    fn test_parse_sign_up_with_session() {
        let id = Uuid::new_v4();
        let body = json!({
            "access_token": "access",
            "refresh_token": "refresh",
            "expires_in": 3600,
            "user": { "id": id, "email": "a@b.com" }
        });
        let now = Utc::now();
        let response = parse_sign_up(body, now).unwrap();
        let session = response.session.unwrap();
        assert_eq!(response.user.id, id);
        assert_eq!(session.expires_at, now + chrono::Duration::seconds(3600));
    }

    #[test]
    fn test_parse_sign_up_pending_confirmation() {
        let id = Uuid::new_v4();
        let body = json!({ "id": id, "email": "a@b.com", "confirmation_sent_at": "2024-01-01T00:00:00Z" });
        let response = parse_sign_up(body, Utc::now()).unwrap();
        assert_eq!(response.user.id, id);
        assert!(response.session.is_none());
    }

    #[test]
    fn test_token_expires_at_wins_over_expires_in() {
        let token = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: Some(60),
            expires_at: Some(1_700_000_000),
            user: AuthUser {
                id: Uuid::nil(),
                email: String::new(),
            },
        };
        let session = token.into_session(Utc::now());
        assert_eq!(session.expires_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_endpoint_and_redirect() {
        let client = GoTrueClient::new(&config()).unwrap();
        assert_eq!(
            client.endpoint("/user"),
            "https://auth.example.com/auth/v1/user"
        );
        assert_eq!(
            client.with_redirect("/recover", Some("http://localhost:3000/reset?x=1")),
            "https://auth.example.com/auth/v1/recover?redirect_to=http%3A%2F%2Flocalhost%3A3000%2Freset%3Fx%3D1"
        );
    }
}
