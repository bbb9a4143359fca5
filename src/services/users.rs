//! Staff accounts and authentication

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    clock::Clock,
    config::AuthConfig,
    error::{AppError, AppResult, Entity},
    models::{
        user::{LoginRequest, RegisterUser, UserInfo},
        User, UserClaims,
    },
    repository::UserStore,
};

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(store: Arc<dyn UserStore>, clock: Arc<dyn Clock>, config: AuthConfig) -> Self {
        Self { store, clock, config }
    }

    /// Register a new staff account and sign a token for it
    pub async fn register(&self, request: RegisterUser) -> AppResult<(UserInfo, String)> {
        let user = self.create_user(request, false).await?;
        let token = self.issue_token(&user)?;
        Ok((UserInfo::from(user), token))
    }

    /// Create an account with the given role
    pub async fn create_user(&self, request: RegisterUser, is_admin: bool) -> AppResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            password_hash: self.hash_password(&request.password)?,
            is_admin,
            created_at: self.clock.now(),
        };
        self.store.insert_user(&user).await?;
        tracing::info!(user_id = %user.id, is_admin, "User registered");
        Ok(user)
    }

    /// Exchange email and password for a token
    pub async fn authenticate(&self, request: LoginRequest) -> AppResult<String> {
        let invalid = || AppError::Validation("Invalid email or password".to_string());

        let user = self
            .store
            .find_user_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;

        if !self.verify_password(&user, &request.password)? {
            tracing::warn!(user_id = %user.id, "Failed login");
            return Err(invalid());
        }

        self.issue_token(&user)
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<UserInfo> {
        self.store
            .find_user(id)
            .await?
            .map(UserInfo::from)
            .ok_or(AppError::NotFound(Entity::User))
    }

    /// Decode and check a token from a request header
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        Ok(UserClaims::from_token(token, &self.config.jwt_secret)?)
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user, self.clock.now(), self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
