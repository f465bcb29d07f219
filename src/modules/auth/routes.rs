use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::service::{otp, token};
use crate::{
    modules::user::{self, repository::Role},
    types::Context,
    utils::{
        error::{Error, Result},
        validation::{validate_phone_number, ValidatedJson},
    },
};

#[derive(Deserialize, Validate)]
struct RegisterPayload {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(custom(function = "validate_phone_number"))]
    phone: String,
    #[validate(email(message = "Invalid email address"))]
    email: Option<String>,
    role: Role,
    location: Option<String>,
}

async fn register(
    State(ctx): State<Arc<Context>>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> Result<impl IntoResponse> {
    if payload.role == Role::Admin {
        return Err(Error::Validation(String::from(
            "Admin accounts cannot be self-registered",
        )));
    }

    if user::repository::find_by_phone_or_email(
        &ctx.db_conn.pool,
        &payload.phone,
        payload.email.as_deref(),
    )
    .await?
    .is_some()
    {
        return Err(Error::Conflict(String::from(
            "User with this phone or email already exists",
        )));
    }

    otp::send(
        &ctx,
        &payload.phone,
        Some(otp::PendingRegistration {
            name: payload.name,
            phone: payload.phone.clone(),
            email: payload.email,
            role: payload.role,
            location: payload.location,
        }),
    )
    .await;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "OTP sent to your phone", "phone": payload.phone })),
    ))
}

#[derive(Deserialize, Validate)]
struct RequestOtpPayload {
    #[validate(custom(function = "validate_phone_number"))]
    phone: String,
}

async fn request_otp(
    State(ctx): State<Arc<Context>>,
    ValidatedJson(payload): ValidatedJson<RequestOtpPayload>,
) -> Result<impl IntoResponse> {
    otp::send(&ctx, &payload.phone, None).await;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "OTP sent to your phone", "phone": payload.phone })),
    ))
}

#[derive(Deserialize, Validate)]
struct VerifyOtpPayload {
    #[validate(length(min = 1, message = "Phone is required"))]
    phone: String,
    #[serde(alias = "code")]
    #[validate(length(min = 1, message = "OTP is required"))]
    otp: String,
}

async fn verify_otp(
    State(ctx): State<Arc<Context>>,
    ValidatedJson(payload): ValidatedJson<VerifyOtpPayload>,
) -> Result<impl IntoResponse> {
    let record = otp::verify(&ctx, &payload.phone, &payload.otp).await?;

    let user = match record.pending_registration {
        Some(pending) => {
            user::repository::create(
                &ctx.db_conn.pool,
                user::repository::CreateUserPayload {
                    name: pending.name,
                    phone: pending.phone,
                    email: pending.email,
                    role: pending.role,
                    location: pending.location,
                    is_verified: true,
                },
            )
            .await?
        }
        None => user::repository::find_by_phone(&ctx.db_conn.pool, &payload.phone)
            .await?
            .ok_or_else(|| Error::NotFound(String::from("User not found")))?,
    };

    let token = token::issue(&ctx.auth.jwt_secret, ctx.auth.token_ttl_days, &user)?;
    otp::consume(&ctx, &payload.phone).await;

    tracing::info!("User {} signed in", user.id);

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "OTP verified successfully",
            "token": token,
            "user": user,
        })),
    ))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/register", post(register))
        .route("/request-otp", post(request_otp))
        .route("/verify-otp", post(verify_otp))
}
