use serde::Serialize;
use ulid::Ulid;

use super::repository::{self, Payment, PaymentStatus, TransactionStatus};
use crate::{
    modules::{booking, order},
    types::Context,
    utils::error::{Error, Result},
};

const GATEWAY: &str = "mock";

/// What a payment is being collected for.
pub enum PaymentTarget {
    Order(String),
    Booking(String),
    Standalone(f64),
}

#[derive(Serialize, Debug, Clone)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct PaymentDetails {
    pub payment: Payment,
    pub gateway_order: GatewayOrder,
}

fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

async fn resolve_amount(
    ctx: &Context,
    payer_id: &str,
    target: &PaymentTarget,
) -> Result<(f64, Option<String>, Option<String>)> {
    match target {
        PaymentTarget::Order(order_id) => {
            let order = order::repository::find_by_id(&ctx.db_conn.pool, order_id)
                .await?
                .filter(|order| order.buyer_id == payer_id)
                .ok_or_else(|| Error::NotFound(String::from("Order not found")))?;

            if order.payment_status == PaymentStatus::Paid {
                return Err(Error::Validation(String::from("Payment has already been made")));
            }

            Ok((order.total_amount, Some(order.id), None))
        }
        PaymentTarget::Booking(booking_id) => {
            let booking = booking::repository::find_by_id(&ctx.db_conn.pool, booking_id)
                .await?
                .filter(|booking| booking.renter_id == payer_id)
                .ok_or_else(|| Error::NotFound(String::from("Booking not found")))?;

            if booking.payment_status == PaymentStatus::Paid {
                return Err(Error::Validation(String::from("Payment has already been made")));
            }

            Ok((booking.total_amount, None, Some(booking.id)))
        }
        PaymentTarget::Standalone(amount) => Ok((*amount, None, None)),
    }
}

/// Records a payment attempt and hands back the gateway order the client pays
/// against. The gateway itself is not contacted.
pub async fn create_order(
    ctx: &Context,
    payer_id: &str,
    target: PaymentTarget,
) -> Result<PaymentDetails> {
    let (amount, order_id, booking_id) = resolve_amount(ctx, payer_id, &target).await?;

    if amount <= 0.0 {
        return Err(Error::Validation(String::from("Amount must be greater than zero")));
    }

    let payment = repository::create(
        &ctx.db_conn.pool,
        repository::CreatePaymentPayload {
            user_id: payer_id.to_string(),
            order_id,
            booking_id,
            amount,
            currency: ctx.payment.currency.clone(),
            gateway: String::from(GATEWAY),
            gateway_transaction_id: format!("order_{}", Ulid::new()),
        },
    )
    .await?;

    tracing::info!("Created payment {} for {} {}", payment.id, amount, payment.currency);

    let gateway_order = GatewayOrder {
        id: payment.gateway_transaction_id.clone().unwrap_or_default(),
        amount: to_minor_units(payment.amount),
        currency: payment.currency.clone(),
        receipt: payment.id.clone(),
    };

    Ok(PaymentDetails {
        payment,
        gateway_order,
    })
}

pub struct VerifyPaymentPayload {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub payment_method: Option<String>,
}

/// Marks the payment completed and settles whatever it was collected for.
pub async fn verify(
    ctx: &Context,
    payer_id: &str,
    payload: VerifyPaymentPayload,
) -> Result<Payment> {
    let mut tx = ctx
        .db_conn
        .pool
        .begin()
        .await
        .map_err(|err| Error::internal("Failed to start database transaction", err))?;

    let payment =
        repository::find_by_gateway_transaction_id(&mut *tx, &payload.gateway_order_id)
            .await?
            .filter(|payment| payment.user_id == payer_id)
            .ok_or_else(|| Error::NotFound(String::from("Payment not found")))?;

    if payment.status == TransactionStatus::Completed {
        return Err(Error::Validation(String::from("Payment has already been verified")));
    }

    let payment = repository::complete(&mut *tx, &payment.id, payload.payment_method).await?;

    if let Some(order_id) = &payment.order_id {
        order::repository::update_payment_status(&mut *tx, order_id, PaymentStatus::Paid).await?;
    }

    if let Some(booking_id) = &payment.booking_id {
        booking::repository::update_payment_status(&mut *tx, booking_id, PaymentStatus::Paid)
            .await?;
    }

    tx.commit()
        .await
        .map_err(|err| Error::internal("Failed to commit database transaction", err))?;

    tracing::info!(
        "Payment {} verified with gateway payment {}",
        payment.id,
        payload.gateway_payment_id
    );

    Ok(payment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_minor_units() {
        assert_eq!(to_minor_units(266.5), 26650);
        assert_eq!(to_minor_units(0.1 + 0.2), 30);
    }
}
