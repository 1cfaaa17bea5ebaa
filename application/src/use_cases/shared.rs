//! Helpers shared by the use cases.

use cofounder_domain::{DomainError, IdeaRecord, ModelSelection};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Whether cancellation has been requested on an optional token.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(CancellationToken::is_cancelled)
}

/// Wait until the optional token is cancelled; never resolves without one.
pub(crate) async fn cancelled(token: &Option<CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Layer client `agent -> model` settings over the configured selection.
pub(crate) fn select_models(
    configured: &ModelSelection,
    settings: &HashMap<String, String>,
) -> Result<ModelSelection, DomainError> {
    let overrides = ModelSelection::parse_settings(settings)?;
    Ok(configured.layered(&overrides))
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Last saved state of a record while a chain works on it.
///
/// Lives outside the chain future so a panic or an aborted task still
/// leaves the fields produced so far readable.
pub(crate) struct RecordCheckpoint(Mutex<IdeaRecord>);

impl RecordCheckpoint {
    pub(crate) fn new(record: &IdeaRecord) -> Self {
        Self(Mutex::new(record.clone()))
    }

    pub(crate) fn save(&self, record: &IdeaRecord) {
        let mut latest = self.0.lock().unwrap_or_else(|p| p.into_inner());
        *latest = record.clone();
    }

    pub(crate) fn latest(&self) -> IdeaRecord {
        self.0.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}
