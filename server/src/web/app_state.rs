use std::sync::Arc;

use crate::engine::chat_engine::ChatEngine;

/// Shared state injected into every request handler.
pub struct AppState {
    pub engine: Arc<ChatEngine>,
}
