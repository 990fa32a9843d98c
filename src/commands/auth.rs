use std::time::SystemTime;

use serde::Serialize;

use crate::auth::TokenStore;
use crate::cli::AuthCommand;
use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
struct AuthStatus {
    profile: String,
    token_file: String,
    logged_in: bool,
    email: Option<String>,
    expired: Option<bool>,
    expires_in_seconds: Option<i64>,
    has_refresh_token: Option<bool>,
}

pub async fn run(ctx: &AppContext, command: AuthCommand) -> AppResult<()> {
    match command {
        AuthCommand::Status => status(ctx),
    }
}

fn status(ctx: &AppContext) -> AppResult<()> {
    let token = ctx.token_store.load(&ctx.profile)?;
    let now = SystemTime::now();

    let status = AuthStatus {
        profile: ctx.profile.clone(),
        token_file: ctx.paths.token_file(&ctx.profile).display().to_string(),
        logged_in: token.is_some(),
        email: token.as_ref().and_then(|token| token.email.clone()),
        expired: token.as_ref().map(|token| token.is_expired(now)),
        expires_in_seconds: token.as_ref().and_then(|token| token.expires_in_seconds(now)),
        has_refresh_token: token.as_ref().map(|token| token.has_refresh_token()),
    };

    let text = if status.logged_in {
        let refresh_hint = match status.has_refresh_token {
            Some(true) => " (refresh available)",
            _ => " (no refresh token)",
        };
        format!(
            "{}: token stored{}{}",
            status.profile,
            status
                .email
                .as_ref()
                .map(|email| format!(" for {email}"))
                .unwrap_or_default(),
            refresh_hint,
        )
    } else {
        format!(
            "{}: no token stored at {}",
            status.profile, status.token_file
        )
    };

    ctx.output.emit(&text, &status)
}
