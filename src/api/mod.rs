// API 路由汇总。
pub mod convert;
pub mod errors;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.server.max_upload_bytes;
    Router::new()
        .merge(convert::router(max_upload_bytes))
        .with_state(state)
}
