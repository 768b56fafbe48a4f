//! Identity and authorization for the commerce backend.
//!
//! This crate provides:
//! - Password hashing and verification (Argon2id)
//! - Signed, time-bounded identity tokens (HS256 JWT)
//! - The authorization gate that turns a bearer credential into a [`CallerContext`]

pub mod error;
pub mod gate;
pub mod password;
pub mod token;

pub use common::{AccountId, CallerContext, Role};
pub use error::{AuthError, CredentialError, TokenError};
pub use gate::{Authenticator, require_role};
pub use token::{TOKEN_LIFETIME_HOURS, TokenService};
