use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Directory tree plagiarism comparisons are confined to.
    pub compare_root: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db: PgPool, compare_root: PathBuf) -> Self {
        Self {
            db,
            compare_root: Arc::new(compare_root),
        }
    }
}
