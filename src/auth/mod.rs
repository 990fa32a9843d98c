//! Stored credentials. Tokens are issued by an external authorization flow;
//! this crate only loads them and refreshes expired access tokens.

pub mod refresh;
pub mod token;
pub mod token_store;

pub use refresh::{RefreshConfig, refresh_if_expired};
pub use token::TokenSet;
pub use token_store::{FileTokenStore, TokenStore};
