use std::sync::Arc;

use axum::{
    async_trait,
    extract::{Extension, FromRequestParts},
    http::{header, request::Parts},
    RequestPartsExt,
};

use super::service::token::{self, Identity};
use crate::{
    modules::user::repository::Role,
    types::Context,
    utils::error::{Error, Result},
};

fn get_token_from_header(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for routes that need a signed-in caller.
#[derive(Debug, Clone)]
pub struct Auth {
    pub identity: Identity,
}

impl Auth {
    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// Fails with `Forbidden` unless the caller holds one of `roles`.
    pub fn authorize(&self, roles: &[Role]) -> Result<()> {
        if roles.contains(&self.identity.role) {
            return Ok(());
        }

        tracing::warn!(
            "User {} with role {} attempted a restricted action",
            self.identity.user_id,
            self.identity.role
        );
        Err(Error::Forbidden(String::from("Insufficient permissions")))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let Extension(ctx) = parts
            .extract::<Extension<Arc<Context>>>()
            .await
            .map_err(|err| Error::internal("Application context missing from request", err))?;

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(get_token_from_header)
            .ok_or(Error::Unauthorized(String::from("Access token required")))?;

        token::verify(&ctx.auth.jwt_secret, token).map(|identity| Self { identity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(role: Role) -> Auth {
        Auth {
            identity: Identity {
                user_id: String::from("user"),
                phone: String::from("9000000001"),
                role,
            },
        }
    }

    #[test]
    fn extracts_bearer_tokens_only() {
        assert_eq!(get_token_from_header("Bearer abc.def"), Some("abc.def"));
        assert_eq!(get_token_from_header("Bearer "), None);
        assert_eq!(get_token_from_header("Basic abc"), None);
    }

    #[test]
    fn authorize_allows_listed_roles() {
        assert!(auth(Role::Farmer).authorize(&[Role::Farmer]).is_ok());
        assert!(auth(Role::Admin)
            .authorize(&[Role::Farmer, Role::Admin])
            .is_ok());
    }

    #[test]
    fn authorize_rejects_other_roles() {
        assert!(matches!(
            auth(Role::Consumer).authorize(&[Role::EquipmentProvider]),
            Err(Error::Forbidden(_))
        ));
    }
}
