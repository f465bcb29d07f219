use std::borrow::Cow;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use super::error::Error;

/// JSON body that has been deserialized and run through its `Validate` rules.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                tracing::warn!("Rejected request body: {}", rejection.body_text());
                Error::Validation(rejection.body_text())
            })?;

        payload.validate()?;

        Ok(Self(payload))
    }
}

/// Query string parameters; malformed values are rejected with a JSON error body.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| Error::Validation(rejection.body_text()))?;

        Ok(Self(params))
    }
}

pub fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    let regex = Regex::new(r"^\+?\d{10,15}$").map_err(|_| ValidationError::new("INVALID_REGEX"))?;
    match regex.is_match(phone_number) {
        true => Ok(()),
        false => Err(ValidationError::new("INVALID_PHONE_NUMBER")
            .with_message(Cow::from("Phone number must contain 10 to 15 digits"))),
    }
}
