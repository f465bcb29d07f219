use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    modules::user::repository::{Role, User},
    utils::error::{Error, Result},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub phone: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Who is making the request, as recorded in a verified session token.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub phone: String,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            phone: claims.phone,
            role: claims.role,
        }
    }
}

pub fn issue(secret: &str, ttl_days: i64, user: &User) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.clone(),
        phone: user.phone.clone(),
        role: user.role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(ttl_days)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| Error::internal("Failed to sign session token", err))
}

pub fn verify(secret: &str, token: &str) -> Result<Identity> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.into())
    .map_err(|err| {
        tracing::debug!("Rejected session token: {}", err);
        Error::Forbidden(String::from("Invalid or expired token"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        let now = Utc::now().naive_utc();
        User {
            id: String::from("01HZX7Q1M1V3K4D5E6F7G8H9J0"),
            name: String::from("Asha"),
            phone: String::from("9000000001"),
            email: None,
            role,
            location: None,
            is_verified: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_carries_the_user_identity() {
        let token = issue("secret", 7, &user(Role::Farmer)).unwrap();
        let identity = verify("secret", &token).unwrap();

        assert_eq!(identity.user_id, "01HZX7Q1M1V3K4D5E6F7G8H9J0");
        assert_eq!(identity.phone, "9000000001");
        assert_eq!(identity.role, Role::Farmer);
    }

    #[test]
    fn token_signed_with_another_secret_is_forbidden() {
        let token = issue("secret", 7, &user(Role::Consumer)).unwrap();
        assert!(matches!(
            verify("another-secret", &token),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn expired_token_is_forbidden() {
        let token = issue("secret", -1, &user(Role::Consumer)).unwrap();
        assert!(matches!(verify("secret", &token), Err(Error::Forbidden(_))));
    }

    #[test]
    fn garbage_token_is_forbidden() {
        assert!(matches!(
            verify("secret", "not-a-token"),
            Err(Error::Forbidden(_))
        ));
    }
}
