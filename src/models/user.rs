//! User model, token claims and authentication requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Staff account allowed to operate the API
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// User as returned by the API (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 5, max = 50, message = "name must be 5 to 50 characters"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    #[validate(length(min = 5, max = 255, message = "email must be 5 to 255 characters"))]
    pub email: String,
    #[validate(length(min = 6, max = 255, message = "password must be 6 to 255 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    #[validate(length(min = 5, max = 255, message = "email must be 5 to 255 characters"))]
    pub email: String,
    #[validate(length(min = 6, max = 255, message = "password must be 6 to 255 characters"))]
    pub password: String,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub name: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn for_user(user: &User, now: DateTime<Utc>, expiration_hours: u64) -> Self {
        let iat = now.timestamp();
        Self {
            sub: user.id.to_string(),
            user_id: user.id,
            name: user.name.clone(),
            is_admin: user.is_admin,
            exp: iat + (expiration_hours as i64 * 3600),
            iat,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin rights required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Librarian".into(),
            email: "desk@library.test".into(),
            password_hash: String::new(),
            is_admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_keeps_role() {
        let claims = UserClaims::for_user(&user(true), Utc::now(), 1);
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();

        assert_eq!(parsed.user_id, claims.user_id);
        assert!(parsed.require_admin().is_ok());
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn non_admin_is_rejected() {
        let claims = UserClaims::for_user(&user(false), Utc::now(), 1);
        assert!(matches!(claims.require_admin(), Err(AppError::Authorization(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = UserClaims::for_user(&user(false), Utc::now() - chrono::Duration::hours(5), 1);
        let token = claims.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }
}
