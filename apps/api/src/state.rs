use std::sync::Arc;

use sqlx::PgPool;

use crate::chat::ChatClient;
use crate::config::Config;
use crate::payment::AdminNotifier;
use crate::screening::score::ResumeScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Pluggable resume scorer. Default: LexicalScorer.
    pub scorer: Arc<dyn ResumeScorer>,
    pub chat: ChatClient,
    /// Outbound admin notifications (candidate IDs, resume requests).
    pub notifier: Arc<dyn AdminNotifier>,
}
