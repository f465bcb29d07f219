use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tokio::sync::Mutex;

use crate::{
    modules::user::repository::Role,
    types::Context,
    utils::error::{Error, Result},
};

/// Registration details held back until the phone number is verified.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRegistration {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: Role,
    pub location: Option<String>,
}

#[derive(Clone, Debug)]
pub struct OtpRecord {
    pub code: String,
    pub pending_registration: Option<PendingRegistration>,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Holds at most one outstanding challenge per phone number.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Stores `record` for `phone`, replacing any earlier challenge.
    async fn put(&self, phone: &str, record: OtpRecord);
    async fn get(&self, phone: &str) -> Option<OtpRecord>;
    async fn remove(&self, phone: &str) -> Option<OtpRecord>;
}

#[derive(Default)]
pub struct InMemoryOtpStore {
    records: Mutex<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, phone: &str, record: OtpRecord) {
        self.records.lock().await.insert(phone.to_string(), record);
    }

    async fn get(&self, phone: &str) -> Option<OtpRecord> {
        self.records.lock().await.get(phone).cloned()
    }

    async fn remove(&self, phone: &str) -> Option<OtpRecord> {
        self.records.lock().await.remove(phone)
    }
}

fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Issues a fresh code for `phone`. The code is written to the log in place of
/// an SMS.
pub async fn send(
    ctx: &Context,
    phone: &str,
    pending_registration: Option<PendingRegistration>,
) -> OtpRecord {
    let record = OtpRecord {
        code: generate_code(),
        pending_registration,
        expires_at: Utc::now() + Duration::seconds(ctx.otp.ttl_seconds),
    };

    ctx.otp.store.put(phone, record.clone()).await;

    tracing::info!("OTP for {}: {}", phone, record.code);

    record
}

/// Checks `code` against the outstanding challenge for `phone`. The record is
/// left in place; callers consume it once the session is issued.
pub async fn verify(ctx: &Context, phone: &str, code: &str) -> Result<OtpRecord> {
    let record = match ctx.otp.store.get(phone).await {
        Some(record) if !record.is_expired() => record,
        Some(_) => {
            ctx.otp.store.remove(phone).await;
            return Err(Error::Validation(String::from("OTP expired or invalid")));
        }
        None => return Err(Error::Validation(String::from("OTP expired or invalid"))),
    };

    if record.code != code {
        tracing::warn!("Invalid OTP supplied for {}", phone);
        return Err(Error::Validation(String::from("Invalid OTP")));
    }

    Ok(record)
}

pub async fn consume(ctx: &Context, phone: &str) {
    ctx.otp.store.remove(phone).await;
}
