use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Role names carried in tokens issued by the identity collaborator.
pub mod roles {
    pub const ADMIN: &str = "ADMIN";
    pub const EMPLOYEE: &str = "EMPLOYEE";
    pub const CUSTOMER: &str = "CUSTOMER";

    /// Roles allowed to run fleet operations (everything but read-only listing).
    pub const STAFF: &[&str] = &[ADMIN, EMPLOYEE];
}

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Authenticated caller data extracted from a validated token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(roles::ADMIN)
    }

    pub fn is_customer_only(&self) -> bool {
        self.has_role(roles::CUSTOMER) && !roles::STAFF.iter().any(|r| self.has_role(r))
    }

    /// Fails with Forbidden unless the caller holds at least one of `allowed`.
    pub fn require_any(&self, allowed: &[&str]) -> Result<(), ServiceError> {
        if allowed.iter().any(|r| self.has_role(r)) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "Requires one of roles: {}",
                allowed.join(", ")
            )))
        }
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_expiration_secs: usize,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, token_expiration_secs: usize) -> Self {
        Self {
            jwt_secret,
            jwt_issuer: "fleet-api".to_string(),
            token_expiration_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token expired")]
    ExpiredToken,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Internal auth error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "AUTH_MISSING"),
            AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "AUTH_INVALID_TOKEN"),
            AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "AUTH_EXPIRED_TOKEN"),
            AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "AUTH_FORBIDDEN"),
            AuthError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_INTERNAL_ERROR")
            }
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Validates bearer tokens; token issuance lives with the identity
/// collaborator, this service only needs the shared secret.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[self.config.jwt_issuer.clone()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken(e.to_string()),
        })
    }

    /// Issues a token carrying the given roles. Used by tests and tooling;
    /// the production identity boundary mints its own.
    pub fn issue_token(
        &self,
        user_id: &str,
        name: Option<String>,
        roles: Vec<String>,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            name,
            roles,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.config.token_expiration_secs as i64,
            iss: self.config.jwt_issuer.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::InternalError(e.to_string()))
    }
}

/// Authentication middleware that validates the bearer token and stores the
/// resulting AuthUser in request extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return AuthError::MissingAuth.into_response(),
    };

    match auth_service.validate_token(token) {
        Ok(claims) => {
            let user = AuthUser {
                user_id: claims.sub,
                name: claims.name,
                roles: claims.roles,
                token_id: claims.jti,
            };
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}
