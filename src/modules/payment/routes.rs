use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::service::{self, PaymentTarget};
use crate::{
    modules::auth::middleware::Auth,
    types::Context,
    utils::{
        error::{Error, Result},
        validation::ValidatedJson,
    },
};

#[derive(Deserialize, Validate)]
struct CreatePaymentOrderPayload {
    order_id: Option<String>,
    booking_id: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than zero"))]
    amount: Option<f64>,
}

impl CreatePaymentOrderPayload {
    fn target(self) -> Result<PaymentTarget> {
        match (self.order_id, self.booking_id, self.amount) {
            (Some(order_id), None, _) => Ok(PaymentTarget::Order(order_id)),
            (None, Some(booking_id), _) => Ok(PaymentTarget::Booking(booking_id)),
            (None, None, Some(amount)) => Ok(PaymentTarget::Standalone(amount)),
            (Some(_), Some(_), _) => Err(Error::Validation(String::from(
                "A payment cannot cover both an order and a booking",
            ))),
            (None, None, None) => Err(Error::Validation(String::from(
                "One of order_id, booking_id or amount is required",
            ))),
        }
    }
}

async fn create_payment_order(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    ValidatedJson(payload): ValidatedJson<CreatePaymentOrderPayload>,
) -> Result<impl IntoResponse> {
    let details = service::create_order(&ctx, auth.user_id(), payload.target()?).await?;

    Ok((StatusCode::CREATED, Json(details)))
}

#[derive(Deserialize, Validate)]
struct VerifyPaymentPayload {
    #[validate(length(min = 1, message = "Gateway order id is required"))]
    gateway_order_id: String,
    #[validate(length(min = 1, message = "Gateway payment id is required"))]
    gateway_payment_id: String,
    payment_method: Option<String>,
}

async fn verify_payment(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    ValidatedJson(payload): ValidatedJson<VerifyPaymentPayload>,
) -> Result<impl IntoResponse> {
    let payment = service::verify(
        &ctx,
        auth.user_id(),
        service::VerifyPaymentPayload {
            gateway_order_id: payload.gateway_order_id,
            gateway_payment_id: payload.gateway_payment_id,
            payment_method: payload.payment_method,
        },
    )
    .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Payment verified successfully", "payment": payment })),
    ))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/create-order", post(create_payment_order))
        .route("/verify", post(verify_payment))
}
