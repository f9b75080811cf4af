//! Token issuing service.

use crate::error::ApiError;
use crate::user::{AuthTokensResponse, User};

use super::jwt::{generate_access_token, generate_refresh_token, verify_token, Claims, JwtError};

impl From<JwtError> for ApiError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            JwtError::EncodingFailed(msg) => ApiError::InternalError(msg),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Issues and verifies JWT token pairs. Stateless: tokens carry all the
/// claims needed by the [`crate::middleware::AuthenticatedUser`] extractor.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_days: i64,
}

impl AuthService {
    pub fn new(
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        refresh_token_ttl_days: i64,
    ) -> Self {
        Self {
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_days,
        }
    }

    /// Get the JWT secret (for token verification in extractors)
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Issue an access/refresh token pair for an authenticated user
    pub fn issue_tokens(&self, user: &User) -> Result<AuthTokensResponse, JwtError> {
        let access_token =
            generate_access_token(user, &self.jwt_secret, self.access_token_ttl_seconds)?;
        let refresh_token =
            generate_refresh_token(user, &self.jwt_secret, self.refresh_token_ttl_days)?;

        Ok(AuthTokensResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl_seconds,
            user: user.clone().into(),
        })
    }

    /// Verify a refresh token and return its claims
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = verify_token(token, &self.jwt_secret)?;

        if claims.token_type != "refresh" {
            return Err(JwtError::InvalidToken("Expected refresh token".to_string()));
        }

        Ok(claims)
    }
}
