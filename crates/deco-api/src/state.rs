use std::sync::Arc;

use tracing::{error, warn};

use deco_db::Database;

use crate::clock::Clock;
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
    pub clock: Arc<dyn Clock>,
}

/// The persistence collaborator as resolved at startup. There is no
/// reconnect: an unavailable store stays unavailable for the process lifetime.
#[derive(Clone)]
pub enum Store {
    Connected(Arc<Database>),
    Unavailable,
}

impl Store {
    pub fn db(&self) -> Result<Arc<Database>, ApiError> {
        match self {
            Store::Connected(db) => Ok(db.clone()),
            Store::Unavailable => Err(ApiError::Unavailable),
        }
    }
}

impl AppStateInner {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> AppState {
        Arc::new(Self { store, clock })
    }

    /// Run a blocking DB call off the async runtime. Storage failures come
    /// back as `ApiError::Internal`.
    pub async fn with_db<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.store.db()?;
        tokio::task::spawn_blocking(move || f(db.as_ref()))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(e.into())
            })?
            .map_err(ApiError::Internal)
    }
}

/// Listing reads report storage failures as an empty result instead of an
/// error. Write paths fail loudly; this is the one place the two differ.
/// An unavailable store is still reported.
pub fn soft_read<T>(result: Result<Vec<T>, ApiError>, what: &str) -> Result<Vec<T>, ApiError> {
    match result {
        Err(ApiError::Internal(e)) => {
            warn!("Listing {} failed, returning empty: {:#}", what, e);
            Ok(Vec::new())
        }
        other => other,
    }
}
