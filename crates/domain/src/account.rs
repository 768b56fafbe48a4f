//! Account registration, login, and profile management.

use auth::{CredentialError, TokenError, TokenService, password};
use common::{AccountId, Role};
use store::{Account, AccountChanges, AccountStore, NewAccount, StoreError};
use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const EMAIL_CONSTRAINT: &str = "accounts_email_key";

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error("first name is required")]
    MissingName,

    #[error("password must be at least 8 characters")]
    WeakPassword,

    /// Another account already uses the email.
    #[error("an account with this email address already exists")]
    EmailTaken,

    /// Unknown email or wrong password. The two are not distinguished.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("Account not found: {account_id}")]
    NotFound { account_id: AccountId },

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        if err.is_unique_violation_on(EMAIL_CONSTRAINT) {
            AccountError::EmailTaken
        } else {
            AccountError::Store(err)
        }
    }
}

/// Input for self-service registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// An account together with a freshly issued identity token.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub token: String,
}

/// Service for managing accounts.
#[derive(Debug, Clone)]
pub struct AccountService<S> {
    store: S,
    tokens: TokenService,
}

impl<S: AccountStore> AccountService<S> {
    pub fn new(store: S, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Registers a customer account and signs it in.
    #[tracing::instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<Session, AccountError> {
        let email = normalize_email(&registration.email)?;
        if registration.first_name.trim().is_empty() {
            return Err(AccountError::MissingName);
        }
        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::WeakPassword);
        }

        let password_hash = password::hash_blocking(registration.password).await?;
        let account = self
            .store
            .create_account(NewAccount {
                email,
                password_hash,
                role: Role::Customer,
                first_name: registration.first_name.trim().to_string(),
                last_name: registration.last_name,
            })
            .await?;

        metrics::counter!("accounts_registered_total").increment(1);
        tracing::info!(account_id = %account.id, "account registered");

        let token = self.tokens.issue(account.id)?;
        Ok(Session { account, token })
    }

    /// Signs in with email and password.
    #[tracing::instrument(skip(self, plaintext))]
    pub async fn login(&self, email: &str, plaintext: &str) -> Result<Session, AccountError> {
        let email = normalize_email(email).map_err(|_| AccountError::InvalidCredentials)?;

        let Some(account) = self.store.get_account_by_email(&email).await? else {
            password::verify_decoy_blocking(plaintext.to_string()).await?;
            return Err(AccountError::InvalidCredentials);
        };

        if !password::verify_blocking(account.password_hash.clone(), plaintext.to_string()).await? {
            tracing::info!(account_id = %account.id, "login rejected");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(account.id)?;
        Ok(Session { account, token })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, account_id: AccountId) -> Result<Account, AccountError> {
        self.store
            .get_account(account_id)
            .await?
            .ok_or(AccountError::NotFound { account_id })
    }

    /// Applies a partial profile update.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        account_id: AccountId,
        mut changes: AccountChanges,
    ) -> Result<Account, AccountError> {
        if let Some(email) = changes.email.take() {
            changes.email = Some(normalize_email(&email)?);
        }
        if matches!(changes.first_name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(AccountError::MissingName);
        }

        self.store
            .update_account(account_id, changes)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => AccountError::NotFound { account_id },
                other => other.into(),
            })
    }

    /// Deletes an account and every order it owns.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, account_id: AccountId) -> Result<(), AccountError> {
        self.store
            .delete_account(account_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => AccountError::NotFound { account_id },
                other => other.into(),
            })?;

        tracing::info!(%account_id, "account deleted");
        Ok(())
    }

    /// Creates an admin account with the given credentials unless the email is
    /// already registered.
    #[tracing::instrument(skip(self, plaintext))]
    pub async fn ensure_admin(&self, email: &str, plaintext: &str) -> Result<Account, AccountError> {
        let email = normalize_email(email)?;

        if let Some(existing) = self.store.get_account_by_email(&email).await? {
            if existing.role != Role::Admin {
                tracing::warn!(account_id = %existing.id, "bootstrap admin email belongs to a customer account");
            }
            return Ok(existing);
        }

        if plaintext.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::WeakPassword);
        }

        let password_hash = password::hash_blocking(plaintext.to_string()).await?;
        let account = self
            .store
            .create_account(NewAccount {
                email,
                password_hash,
                role: Role::Admin,
                first_name: "Administrator".to_string(),
                last_name: None,
            })
            .await?;

        tracing::info!(account_id = %account.id, "admin account created");
        Ok(account)
    }
}

fn normalize_email(email: &str) -> Result<String, AccountError> {
    let email = email.trim().to_lowercase();
    let well_formed = matches!(
        email.split_once('@'),
        Some((local, domain)) if !local.is_empty() && domain.contains('.')
    );
    if well_formed {
        Ok(email)
    } else {
        Err(AccountError::InvalidEmail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "ada", "@example.com", "ada@localhost"] {
            assert!(
                matches!(normalize_email(email), Err(AccountError::InvalidEmail)),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn duplicate_email_maps_to_email_taken() {
        let err = AccountError::from(StoreError::UniqueViolation {
            constraint: EMAIL_CONSTRAINT.to_string(),
        });
        assert!(matches!(err, AccountError::EmailTaken));

        let err = AccountError::from(StoreError::Unavailable("down".to_string()));
        assert!(matches!(err, AccountError::Store(_)));
    }
}
