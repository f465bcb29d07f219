use crate::{
    modules,
    types::Context,
    utils::error::{Error, Result},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors, trace};

pub fn build_router(ctx: Arc<Context>) -> Router {
    Router::new()
        .merge(modules::get_router())
        .with_state(ctx.clone())
        .layer(Extension(ctx))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(trace::TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_methods([
                    Method::OPTIONS,
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_origin(cors::Any),
        )
}

pub struct App {
    ctx: Arc<Context>,
    router: Router,
}

impl App {
    pub fn new(ctx: Arc<Context>) -> Self {
        let router = build_router(ctx.clone());
        Self { ctx, router }
    }

    pub async fn serve(self) -> Result<()> {
        let address = format!("{}:{}", self.ctx.app.host, self.ctx.app.port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|err| Error::internal(&format!("Failed to bind {}", address), err))?;

        tracing::info!(
            "App is running on {} ({:?})",
            address,
            self.ctx.app.environment
        );

        axum::serve(listener, self.router)
            .await
            .map_err(|err| Error::internal("Server terminated unexpectedly", err))
    }
}
