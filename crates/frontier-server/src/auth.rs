//! Authentication hook for validating player identity.
//!
//! The server never decides who a player is. It hands the login token to
//! an [`Authenticator`] and trusts the [`PlayerId`] that comes back; every
//! later authorization check (see [`InGameController`](crate::InGameController))
//! is made against that id.

use std::collections::HashMap;

use frontier_protocol::PlayerId;

use crate::ServerError;

/// Validates a client's login token and returns their identity.
///
/// `Send + Sync + 'static` because one authenticator is shared by every
/// connection task for the life of the server.
///
/// # Example
///
/// ```rust
/// use frontier_protocol::PlayerId;
/// use frontier_server::{Authenticator, ServerError};
///
/// /// Uses the token itself as the player number. Development only.
/// struct NumericTokens;
///
/// impl Authenticator for NumericTokens {
///     async fn authenticate(&self, token: &str) -> Result<PlayerId, ServerError> {
///         token
///             .parse()
///             .map_err(|_| ServerError::AuthFailed("token must be a number".into()))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates `token`.
    ///
    /// # Errors
    /// `ServerError::AuthFailed` when the token is unknown or invalid.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, ServerError>> + Send;
}

/// A fixed token → player table.
///
/// Handy for tests and LAN games where tokens are handed out up front.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    tokens: HashMap<String, PlayerId>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: accept `token` as `player`.
    pub fn with(mut self, token: impl Into<String>, player: PlayerId) -> Self {
        self.tokens.insert(token.into(), player);
        self
    }
}

impl Authenticator for TokenTable {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, ServerError> {
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| ServerError::AuthFailed("unknown token".into()))
    }
}
