use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use super::repository;
use crate::{modules::auth::middleware::Auth, types::Context, utils::error::Result};

async fn get_stats(State(ctx): State<Arc<Context>>, auth: Auth) -> Result<impl IntoResponse> {
    let stats = repository::get_stats(&ctx.db_conn.pool, auth.user_id(), auth.role()).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "role": auth.role(), "stats": stats })),
    ))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().route("/stats", get(get_stats))
}
