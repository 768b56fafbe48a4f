//! Signed identity tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use common::AccountId;

use crate::error::TokenError;

/// Lifetime of an issued token.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    nbf: i64,
    exp: i64,
}

/// Issues and verifies HS256 identity tokens keyed by a process-wide secret.
///
/// The secret is supplied once at construction; verification never consults
/// the environment.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Issues a token for `account_id`, valid from now for 24 hours.
    pub fn issue(&self, account_id: AccountId) -> Result<String, TokenError> {
        self.issue_at(account_id, Utc::now())
    }

    /// Issues a token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        account_id: AccountId,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: account_id.to_string(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies a token and returns its subject.
    pub fn verify(&self, token: &str) -> Result<AccountId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => {
                    TokenError::TokenNotActive
                }
                _ => TokenError::InvalidToken,
            })?;

        data.claims
            .sub
            .parse()
            .map_err(|_| TokenError::InvalidToken)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret.to_string()))
    }

    #[test]
    fn fresh_token_round_trips_subject() {
        let tokens = service("test-secret");
        let token = tokens.issue(AccountId::new(7)).unwrap();
        assert_eq!(tokens.verify(&token), Ok(AccountId::new(7)));
    }

    #[test]
    fn token_presented_after_25_hours_is_not_active() {
        let tokens = service("test-secret");
        let issued = Utc::now() - Duration::hours(25);
        let token = tokens.issue_at(AccountId::new(7), issued).unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::TokenNotActive));
    }

    #[test]
    fn token_from_the_future_is_not_active() {
        let tokens = service("test-secret");
        let issued = Utc::now() + Duration::hours(1);
        let token = tokens.issue_at(AccountId::new(7), issued).unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::TokenNotActive));
    }

    #[test]
    fn token_signed_with_other_secret_has_invalid_signature() {
        let token = service("secret-a").issue(AccountId::new(7)).unwrap();
        assert_eq!(
            service("secret-b").verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_invalid_token() {
        let tokens = service("test-secret");
        assert_eq!(tokens.verify("garbage"), Err(TokenError::InvalidToken));
        assert_eq!(tokens.verify(""), Err(TokenError::InvalidToken));
    }

    #[test]
    fn non_numeric_subject_is_invalid_token() {
        let tokens = service("test-secret");
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "not-a-number".to_string(),
            iat: now,
            nbf: now,
            exp: now + 3600,
        };
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &tokens.encoding)
                .unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::InvalidToken));
    }
}
