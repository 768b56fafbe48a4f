//! Error types for credential, token, and gate failures.

use store::StoreError;
use thiserror::Error;

/// Failures of the password hashing primitives.
///
/// A password mismatch is not an error; see [`crate::password::verify`].
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The hasher itself failed.
    #[error("Password hashing failed: {0}")]
    Hash(String),

    /// The stored digest could not be parsed.
    #[error("Malformed password digest: {0}")]
    MalformedDigest(String),

    /// The blocking hash task was cancelled or panicked.
    #[error("Password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Reasons an identity token was refused. Used for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid token")]
    InvalidToken,

    #[error("invalid token signature")]
    InvalidSignature,

    /// Expired, or presented before its not-before time.
    #[error("token is not active")]
    TokenNotActive,

    /// The token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Refusals produced by the authorization gate.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer credential was presented.
    #[error("missing bearer credential")]
    MissingCredential,

    /// The Authorization header was not of the form `Bearer <token>`.
    #[error("malformed authorization header")]
    MalformedCredential,

    /// The token failed verification.
    #[error("token rejected: {0}")]
    Token(#[from] TokenError),

    /// The token was valid but its subject no longer exists.
    #[error("account no longer exists")]
    AccountNotFound,

    /// The caller is authenticated but lacks the required role.
    #[error("caller lacks the required role")]
    Forbidden,

    /// The account lookup failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Returns true for refusals the client should see as `unauthorized`.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredential
                | AuthError::MalformedCredential
                | AuthError::Token(_)
                | AuthError::AccountNotFound
        )
    }

    /// Short label used for the rejection metric.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedCredential => "malformed_credential",
            AuthError::Token(TokenError::InvalidSignature) => "invalid_signature",
            AuthError::Token(TokenError::TokenNotActive) => "token_not_active",
            AuthError::Token(_) => "invalid_token",
            AuthError::AccountNotFound => "account_not_found",
            AuthError::Forbidden => "forbidden",
            AuthError::Store(_) => "store",
        }
    }
}
