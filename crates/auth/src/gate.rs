//! Authorization gate.
//!
//! A request moves through `Unauthenticated -> TokenVerified ->
//! IdentityResolved` in [`Authenticator::authenticate`], and optionally
//! through `RoleChecked` in [`require_role`]. Every refusal is terminal.

use common::{CallerContext, Role};
use store::AccountStore;

use crate::error::AuthError;
use crate::token::TokenService;

/// Scheme names are case-insensitive (RFC 7235).
const BEARER_SCHEME: &str = "bearer";

/// Resolves a bearer credential into a verified caller identity.
#[derive(Debug, Clone)]
pub struct Authenticator<S> {
    accounts: S,
    tokens: TokenService,
}

impl<S: AccountStore> Authenticator<S> {
    pub fn new(accounts: S, tokens: TokenService) -> Self {
        Self { accounts, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Authenticates the raw value of an `Authorization` header.
    ///
    /// The account named by the token must still exist; its current role is
    /// read from storage rather than trusted from the token.
    #[tracing::instrument(skip_all)]
    pub async fn authenticate(&self, header: Option<&str>) -> Result<CallerContext, AuthError> {
        let result = self.resolve(header).await;
        if let Err(ref err) = result {
            record_rejection(err);
        }
        result
    }

    async fn resolve(&self, header: Option<&str>) -> Result<CallerContext, AuthError> {
        let token = bearer_token(header)?;

        let account_id = self.tokens.verify(token)?;

        let account = self
            .accounts
            .get_account(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        tracing::debug!(account_id = %account.id, role = %account.role, "caller authenticated");
        Ok(CallerContext::new(account.id, account.role))
    }
}

/// Second stage of the gate: the caller must hold `required`.
pub fn require_role(caller: &CallerContext, required: Role) -> Result<(), AuthError> {
    if caller.role == required {
        Ok(())
    } else {
        let err = AuthError::Forbidden;
        record_rejection(&err);
        Err(err)
    }
}

fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = match header {
        Some(value) if !value.trim().is_empty() => value.trim_start(),
        _ => return Err(AuthError::MissingCredential),
    };

    let (scheme, rest) = value
        .split_at_checked(BEARER_SCHEME.len())
        .ok_or(AuthError::MalformedCredential)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || !(rest.is_empty() || rest.starts_with(' '))
    {
        return Err(AuthError::MalformedCredential);
    }
    let token = rest.trim();

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

fn record_rejection(err: &AuthError) {
    match err {
        AuthError::Store(e) => tracing::error!(error = %e, "account lookup failed during authentication"),
        other => tracing::warn!(reason = other.reason(), error = %other, "request rejected by authorization gate"),
    }
    metrics::counter!("auth_rejections_total", "reason" => err.reason()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert!(matches!(bearer_token(None), Err(AuthError::MissingCredential)));
        assert!(matches!(bearer_token(Some("")), Err(AuthError::MissingCredential)));
        assert!(matches!(
            bearer_token(Some("Bearer ")),
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            bearer_token(Some("Basic dXNlcjpwdw==")),
            Err(AuthError::MalformedCredential)
        ));
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert!(matches!(
            bearer_token(Some("Bearerabc.def.ghi")),
            Err(AuthError::MalformedCredential)
        ));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(Some("bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(Some("BEARER abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert!(matches!(bearer_token(Some("bear")), Err(AuthError::MalformedCredential)));
    }

    #[test]
    fn role_check_is_exact_membership() {
        let customer = CallerContext::new(common::AccountId::new(1), Role::Customer);
        let admin = CallerContext::new(common::AccountId::new(2), Role::Admin);

        assert!(require_role(&admin, Role::Admin).is_ok());
        assert!(matches!(
            require_role(&customer, Role::Admin),
            Err(AuthError::Forbidden)
        ));
        assert!(require_role(&customer, Role::Customer).is_ok());
    }
}
