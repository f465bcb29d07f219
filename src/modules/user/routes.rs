use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Deserialize;
use validator::Validate;

use super::repository;
use crate::{
    modules::auth::middleware::Auth,
    types::Context,
    utils::{
        error::{Error, Result},
        validation::ValidatedJson,
    },
};

async fn get_profile(State(ctx): State<Arc<Context>>, auth: Auth) -> Result<impl IntoResponse> {
    let user = repository::find_by_id(&ctx.db_conn.pool, auth.user_id())
        .await?
        .ok_or_else(|| Error::NotFound(String::from("User not found")))?;

    Ok((StatusCode::OK, Json(user)))
}

#[derive(Deserialize, Validate)]
struct UpdateProfilePayload {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    email: Option<String>,
    location: Option<String>,
}

async fn update_profile(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    ValidatedJson(payload): ValidatedJson<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    let user = repository::update_by_id(
        &ctx.db_conn.pool,
        auth.user_id(),
        repository::UpdateUserPayload {
            name: payload.name,
            email: payload.email,
            location: payload.location,
        },
    )
    .await?
    .ok_or_else(|| Error::NotFound(String::from("User not found")))?;

    Ok((StatusCode::OK, Json(user)))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}
