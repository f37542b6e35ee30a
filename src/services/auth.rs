//! Registration, login and token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user with the default role
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict(
                "User already exists with this email".to_string(),
            ));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&request.name, &request.email, &password_hash, Role::User)
            .await?;

        tracing::info!("Registered user {}", user.email);
        Ok(user)
    }

    /// Authenticate by email and password, returning a JWT token
    pub async fn login(&self, request: LoginRequest) -> AppResult<(String, User)> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Create a JWT token for the given user
    pub fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
