use crate::api::GmailClient;
use crate::auth::{self, FileTokenStore, TokenSet};
use crate::config::{self, AppPaths, Settings};
use crate::error::AppResult;
use crate::output::Output;

#[derive(Debug)]
pub struct AppContext {
    pub profile: String,
    pub paths: AppPaths,
    pub settings: Settings,
    pub token_store: FileTokenStore,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(profile: String, json: bool) -> AppResult<Self> {
        let profile = config::resolve_profile(&profile);
        let paths = AppPaths::discover()?;
        let settings = config::load_settings(&paths, &profile)?;
        let token_store = FileTokenStore::new(paths.clone());
        let output = Output::new(json);

        Ok(Self {
            profile,
            paths,
            settings,
            token_store,
            output,
        })
    }

    /// The stored token, refreshed first if it has expired.
    pub async fn token(&self) -> AppResult<TokenSet> {
        auth::refresh_if_expired(&self.profile, &self.settings, &self.token_store).await
    }

    pub async fn gmail_client(&self) -> AppResult<GmailClient> {
        let token = self.token().await?;
        Ok(GmailClient::new(token.access_token))
    }
}
