use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tracing::info;

use crate::config::Settings;
use crate::error::{AppError, AppResult};

use super::token::TokenSet;
use super::token_store::TokenStore;

const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub token_endpoint: String,
}

impl RefreshConfig {
    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        Ok(Self {
            client_id: settings.client_id()?.to_string(),
            client_secret: settings.client_secret().map(ToOwned::to_owned),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
        })
    }
}

/// Returns the stored token for `profile`, exchanging its refresh token for a
/// new access token first when it has expired.
pub async fn refresh_if_expired<S: TokenStore>(
    profile: &str,
    settings: &Settings,
    store: &S,
) -> AppResult<TokenSet> {
    let current = store.load(profile)?.ok_or_else(|| {
        AppError::Auth(format!(
            "no stored token for profile `{profile}`; authorize the account first"
        ))
    })?;

    if !current.is_expired(SystemTime::now()) {
        return Ok(current);
    }

    let refresh_token = current.refresh_token.clone().ok_or_else(|| {
        AppError::Auth("access token expired and no refresh token is stored".to_string())
    })?;

    let config = RefreshConfig::from_settings(settings)?;
    let mut refreshed = exchange_refresh_token(&config, &refresh_token).await?;
    if refreshed.refresh_token.is_none() {
        refreshed.refresh_token = Some(refresh_token);
    }
    if refreshed.email.is_none() {
        refreshed.email = current.email;
    }

    store.save(profile, &refreshed)?;
    info!(profile, "access token refreshed");
    Ok(refreshed)
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

async fn exchange_refresh_token(config: &RefreshConfig, refresh_token: &str) -> AppResult<TokenSet> {
    let mut form = HashMap::from([
        ("grant_type", "refresh_token".to_string()),
        ("refresh_token", refresh_token.to_string()),
        ("client_id", config.client_id.clone()),
    ]);

    if let Some(client_secret) = &config.client_secret {
        form.insert("client_secret", client_secret.clone());
    }

    let response = reqwest::Client::new()
        .post(&config.token_endpoint)
        .form(&form)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    parse_token_response(status, &body)
}

fn parse_token_response(status: reqwest::StatusCode, body: &str) -> AppResult<TokenSet> {
    if status.is_success() {
        let payload: OAuthTokenResponse = serde_json::from_str(body)?;
        return Ok(TokenSet {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
            expires_at_unix: expires_at_unix(payload.expires_in),
            token_type: payload.token_type,
            scope: payload.scope,
            email: None,
        });
    }

    if let Ok(err_payload) = serde_json::from_str::<OAuthErrorResponse>(body) {
        let error = err_payload
            .error
            .unwrap_or_else(|| "unknown_oauth_error".to_string());
        let description = err_payload
            .error_description
            .unwrap_or_else(|| "no description".to_string());
        return Err(AppError::Auth(format!(
            "oauth token refresh failed ({status}): {error} ({description})"
        )));
    }

    Err(AppError::Auth(format!(
        "oauth token refresh failed ({status}): {body}"
    )))
}

fn expires_at_unix(expires_in: Option<u64>) -> Option<u64> {
    let expires_in = expires_in?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(now.saturating_add(expires_in))
}
