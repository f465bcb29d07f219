pub use crate::utils::database;
use crate::{
    modules::auth::service::otp::{InMemoryOtpStore, OtpStore},
    utils::error::Error,
};
use async_trait::async_trait;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

const DEVELOPMENT_JWT_SECRET: &str = "agrimarket-development-secret";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AppEnvironment {
    Production,
    Development,
}

impl AppEnvironment {
    pub fn from(raw_environment: &str) -> Self {
        match raw_environment {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u16,
}

#[derive(Clone)]
pub struct AuthContext {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

#[derive(Clone)]
pub struct OtpContext {
    pub ttl_seconds: i64,
    pub store: Arc<dyn OtpStore>,
}

#[derive(Clone)]
pub struct PaymentContext {
    pub currency: String,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub db_conn: database::DatabaseConnection,
    pub auth: AuthContext,
    pub otp: OtpContext,
    pub payment: PaymentContext,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub seed_demo_data: bool,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

#[derive(Clone, Debug)]
pub struct OtpConfig {
    pub ttl_seconds: i64,
}

#[derive(Clone, Debug)]
pub struct PaymentConfig {
    pub currency: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub otp: OtpConfig,
    pub payment: PaymentConfig,
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment =
            AppEnvironment::from(env::var("APP_ENV").unwrap_or_default().as_str());
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://agrimarket.db".to_string());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT", 8000u16)?;
        let jwt_secret = match (env::var("JWT_SECRET"), environment) {
            (Ok(secret), _) => secret,
            (Err(_), AppEnvironment::Production) => return Err(ConfigError::Missing("JWT_SECRET")),
            (Err(_), AppEnvironment::Development) => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 4u32)?,
                seed_demo_data: parse_var("SEED_DEMO_DATA", true)?,
            },
            app: AppConfig {
                host,
                environment,
                port,
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_days: parse_var("JWT_TTL_DAYS", 7i64)?,
            },
            otp: OtpConfig {
                ttl_seconds: parse_var("OTP_TTL_SECONDS", 300i64)?,
            },
            payment: PaymentConfig {
                currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            },
        })
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Result<Context, Error>;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Result<Context, Error> {
        let db_conn =
            database::connect(self.database.url.as_str(), self.database.max_connections).await?;
        database::bootstrap(&db_conn, self.database.seed_demo_data).await?;

        Ok(Context {
            app: AppContext {
                host: self.app.host,
                environment: self.app.environment,
                port: self.app.port,
            },
            db_conn,
            auth: AuthContext {
                jwt_secret: self.auth.jwt_secret,
                token_ttl_days: self.auth.token_ttl_days,
            },
            otp: OtpContext {
                ttl_seconds: self.otp.ttl_seconds,
                store: Arc::new(InMemoryOtpStore::new()),
            },
            payment: PaymentContext {
                currency: self.payment.currency,
            },
        })
    }
}
