//! Authentication
//!
//! JWT issuing/validation and the axum extractor that turns a bearer
//! token into a [`CurrentUser`]. Role checks downstream go through the
//! typed [`shared::models::Role`] set carried here.

mod extractor;
mod jwt;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use shared::models::Role;

use crate::utils::AppError;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Constant-time verification against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// The authenticated requester, resolved from JWT claims.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id: i64 = claims
            .sub
            .parse()
            .map_err(|_| format!("Invalid subject: {}", claims.sub))?;
        let roles = claims
            .roles
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Role>().map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id,
            username: claims.username,
            roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_verification_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn current_user_parses_claims() {
        let claims = Claims {
            sub: "42".into(),
            username: "ann".into(),
            roles: "USER,ADMIN".into(),
            exp: 0,
            iat: 0,
            iss: "funko-server".into(),
            aud: "funko-clients".into(),
        };
        let user = CurrentUser::try_from(claims).unwrap();
        assert_eq!(user.id, 42);
        assert!(user.is_admin());
    }

    #[test]
    fn malformed_subject_is_rejected() {
        let claims = Claims {
            sub: "not-a-number".into(),
            username: "ann".into(),
            roles: "USER".into(),
            exp: 0,
            iat: 0,
            iss: "funko-server".into(),
            aud: "funko-clients".into(),
        };
        assert!(CurrentUser::try_from(claims).is_err());
    }
}
