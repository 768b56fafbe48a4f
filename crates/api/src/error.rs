//! API error types with HTTP response mapping.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{AccountError, CatalogError, DomainError, OrderError};

const UNAUTHORIZED: &str = "unauthorized";
const FORBIDDEN: &str = "forbidden";
const INTERNAL: &str = "internal server error";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The authorization gate refused the request.
    Auth(AuthError),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Auth(err) => auth_error_to_response(err),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn internal(detail: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!(error = %detail, "internal server error");
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
}

fn auth_error_to_response(err: AuthError) -> (StatusCode, String) {
    match err {
        AuthError::Forbidden => (StatusCode::FORBIDDEN, FORBIDDEN.to_string()),
        AuthError::Store(e) => internal(e),
        _ => (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()),
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match err {
        DomainError::Order(err) => order_error_to_response(err),
        DomainError::Account(err) => account_error_to_response(err),
        DomainError::Catalog(err) => catalog_error_to_response(err),
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match err {
        OrderError::NoItems | OrderError::InvalidQuantity { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        OrderError::ProductNotFound { .. } | OrderError::TotalOutOfRange => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        OrderError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        OrderError::Forbidden { .. } => (StatusCode::FORBIDDEN, FORBIDDEN.to_string()),
        OrderError::Store(e) => internal(e),
    }
}

fn account_error_to_response(err: AccountError) -> (StatusCode, String) {
    match err {
        AccountError::InvalidEmail | AccountError::MissingName | AccountError::WeakPassword => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        AccountError::EmailTaken => (StatusCode::CONFLICT, err.to_string()),
        AccountError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
        AccountError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        AccountError::Credential(e) => internal(e),
        AccountError::Token(e) => internal(e),
        AccountError::Store(e) => internal(e),
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match err {
        CatalogError::MissingName | CatalogError::InvalidPrice { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        CatalogError::CategoryExists => (StatusCode::CONFLICT, err.to_string()),
        CatalogError::CategoryNotFound { .. } | CatalogError::ProductNotFound { .. } => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CatalogError::Store(e) => internal(e),
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Domain(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderId;
    use store::StoreError;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn every_gate_refusal_is_a_generic_unauthorized() {
        for err in [
            AuthError::MissingCredential,
            AuthError::MalformedCredential,
            AuthError::Token(auth::TokenError::InvalidSignature),
            AuthError::Token(auth::TokenError::TokenNotActive),
            AuthError::AccountNotFound,
        ] {
            let (status, body) = render(err.into()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "unauthorized");
        }
    }

    #[tokio::test]
    async fn role_refusal_is_forbidden() {
        let (status, body) = render(AuthError::Forbidden.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
    }

    #[tokio::test]
    async fn store_failures_are_opaque() {
        let err = OrderError::Store(StoreError::Unavailable("db at 10.0.0.5 down".to_string()));
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn caller_errors_keep_their_message() {
        let (status, body) = render(
            OrderError::NotFound {
                order_id: OrderId::new(5),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Order not found: 5");

        let (status, _) = render(AccountError::EmailTaken.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
