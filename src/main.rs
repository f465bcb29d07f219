use agrimarket_backend::{
    app::App,
    types::{Config, Context, ToContext},
};
use std::{process::ExitCode, sync::Arc};
use tracing_subscriber::prelude::*;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrimarket_backend=debug,tower_http=debug".into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    init_tracing();

    if !dotenv_loaded {
        tracing::debug!("No .env file found, reading configuration from the environment");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let ctx: Arc<Context> = match config.to_context().await {
        Ok(ctx) => Arc::new(ctx),
        Err(err) => {
            tracing::error!("Failed to start: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match App::new(ctx).serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
