//! User model, roles and authentication claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Account role. Owners hold every admin capability plus role management;
/// the two are tracked as one tagged value rather than separate flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    /// Admin-level access: owners are a superset of admins.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as text)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Roles an owner may assign through the directory. Owner is deliberately
/// not an assignable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssignableRole {
    User,
    Admin,
}

impl From<AssignableRole> for Role {
    fn from(r: AssignableRole) -> Self {
        match r {
            AssignableRole::User => Role::User,
            AssignableRole::Admin => Role::Admin,
        }
    }
}

impl std::str::FromStr for AssignableRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(AssignableRole::User),
            "admin" => Ok(AssignableRole::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sanitized user representation returned by auth endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub is_owner: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_admin: user.role.is_admin(),
            is_owner: user.role.is_owner(),
        }
    }
}

/// Directory entry for admin-facing user listings
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
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
}

/// The caller of an operation, resolved for the duration of one request
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn from_claims(claims: &UserClaims) -> Option<Self> {
        let id = Uuid::parse_str(&claims.sub).ok()?;
        Some(Principal {
            id,
            email: claims.email.clone(),
            name: claims.name.clone(),
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::User, Role::Admin, Role::Owner] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn owner_implies_admin() {
        assert!(Role::Owner.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
        assert!(Role::Owner.is_owner());
        assert!(!Role::Admin.is_owner());
    }

    #[test]
    fn owner_is_not_assignable() {
        assert!("owner".parse::<AssignableRole>().is_err());
        assert_eq!("admin".parse::<AssignableRole>().unwrap(), AssignableRole::Admin);
        assert_eq!("user".parse::<AssignableRole>().unwrap(), AssignableRole::User);
    }

    #[test]
    fn claims_round_trip_through_token() {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: Uuid::new_v4().to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            role: Role::Admin,
            exp: now + 3600,
            iat: now,
        };
        let token = claims.create_token("test-secret").unwrap();
        let parsed = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(parsed.email, "alice@example.com");
        assert_eq!(parsed.role, Role::Admin);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
