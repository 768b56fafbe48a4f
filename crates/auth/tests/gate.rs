//! Authorization gate tests against the in-memory account store.

use auth::{AuthError, Authenticator, TokenError, TokenService, require_role};
use chrono::{Duration, Utc};
use common::{AccountId, Role};
use secrecy::SecretString;
use store::{AccountStore, InMemoryStore, NewAccount};

fn tokens() -> TokenService {
    TokenService::new(&SecretString::from("gate-test-secret".to_string()))
}

async fn setup() -> (Authenticator<InMemoryStore>, InMemoryStore) {
    let store = InMemoryStore::new();
    (Authenticator::new(store.clone(), tokens()), store)
}

async fn register(store: &InMemoryStore, email: &str, role: Role) -> AccountId {
    store
        .create_account(NewAccount {
            email: email.to_string(),
            password_hash: "unused".to_string(),
            role,
            first_name: "Test".to_string(),
            last_name: None,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn valid_token_resolves_caller_with_stored_role() {
    let (gate, store) = setup().await;
    let id = register(&store, "admin@example.com", Role::Admin).await;
    let token = gate.tokens().issue(id).unwrap();

    let caller = gate
        .authenticate(Some(&format!("Bearer {token}")))
        .await
        .unwrap();

    assert_eq!(caller.account_id, id);
    assert_eq!(caller.role, Role::Admin);
    assert!(require_role(&caller, Role::Admin).is_ok());
}

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let (gate, _) = setup().await;

    let err = gate.authenticate(None).await.unwrap_err();

    assert!(matches!(err, AuthError::MissingCredential));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let (gate, store) = setup().await;
    let id = register(&store, "a@example.com", Role::Customer).await;
    let token = gate
        .tokens()
        .issue_at(id, Utc::now() - Duration::hours(25))
        .unwrap();

    let err = gate
        .authenticate(Some(&format!("Bearer {token}")))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Token(TokenError::TokenNotActive)));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn token_for_deleted_account_is_unauthorized() {
    let (gate, store) = setup().await;
    let id = register(&store, "a@example.com", Role::Customer).await;
    let token = gate.tokens().issue(id).unwrap();
    store.delete_account(id).await.unwrap();

    let err = gate
        .authenticate(Some(&format!("Bearer {token}")))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::AccountNotFound));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn token_from_another_deployment_is_unauthorized() {
    let (gate, store) = setup().await;
    let id = register(&store, "a@example.com", Role::Customer).await;
    let foreign = TokenService::new(&SecretString::from("other-secret".to_string()))
        .issue(id)
        .unwrap();

    let err = gate
        .authenticate(Some(&format!("Bearer {foreign}")))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Token(TokenError::InvalidSignature)));
}

#[tokio::test]
async fn customer_fails_admin_role_check() {
    let (gate, store) = setup().await;
    let id = register(&store, "a@example.com", Role::Customer).await;
    let token = gate.tokens().issue(id).unwrap();

    let caller = gate
        .authenticate(Some(&format!("Bearer {token}")))
        .await
        .unwrap();
    let err = require_role(&caller, Role::Admin).unwrap_err();

    assert!(matches!(err, AuthError::Forbidden));
    assert!(!err.is_unauthorized());
}
