//! Where the code model comes from, and how changes are observed.
//!
//! The CMake integration owns the model and populates it asynchronously; this
//! crate only subscribes. Absent or unreadable state is valid data (no active
//! selection yet), never an error.

use log::debug;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use super::CodeModel;
use crate::runtime::Runtime;

/// Change notification from the code-model owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    /// The build was reconfigured; the whole model may have changed.
    Reconfigured,
    /// The default build target or selected build type changed.
    TargetChanged,
}

/// Snapshot of the externally-owned build state. Every field is optional;
/// `None` means "no selection yet", not failure.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelState {
    pub code_model: Option<CodeModel>,
    pub default_build_target: Option<String>,
    pub selected_build_type: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait CodeModelSource: Send + Sync {
    /// Current snapshot. Degrades to an empty state when the model is
    /// unavailable; never fails.
    fn state(&self) -> ModelState;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<ModelEvent>;
}

/// Code-model source backed by a JSON state file exported by the CMake
/// integration. Changes are detected by polling the file contents.
pub struct FileModelSource<R: Runtime> {
    runtime: Arc<R>,
    path: PathBuf,
    tx: broadcast::Sender<ModelEvent>,
}

impl<R: Runtime> FileModelSource<R> {
    pub fn new(runtime: Arc<R>, path: PathBuf) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { runtime, path, tx }
    }

    fn read_raw(&self) -> Option<String> {
        match self.runtime.read_to_string(&self.path) {
            Ok(raw) => Some(raw),
            Err(e) => {
                debug!("Code-model state {:?} unavailable: {}", self.path, e);
                None
            }
        }
    }

    fn parse(raw: &str) -> ModelState {
        match serde_json::from_str(raw) {
            Ok(state) => state,
            Err(e) => {
                debug!("Code-model state is malformed: {}", e);
                ModelState::default()
            }
        }
    }

    /// Polls the state file and emits an event whenever it changes:
    /// [`ModelEvent::TargetChanged`] when only the selected target/build type
    /// moved, [`ModelEvent::Reconfigured`] for any other change. Runs until
    /// every receiver is dropped.
    pub async fn poll_changes(&self, interval: Duration) {
        let mut last_raw = self.read_raw();

        loop {
            tokio::time::sleep(interval).await;

            let raw = self.read_raw();
            if raw == last_raw {
                continue;
            }

            let previous = last_raw.as_deref().map(Self::parse).unwrap_or_default();
            let current = raw.as_deref().map(Self::parse).unwrap_or_default();
            last_raw = raw;

            let event = if previous.code_model == current.code_model {
                ModelEvent::TargetChanged
            } else {
                ModelEvent::Reconfigured
            };

            if self.tx.send(event).is_err() {
                // No subscribers left
                return;
            }
        }
    }
}

impl<R: Runtime> CodeModelSource for FileModelSource<R> {
    fn state(&self) -> ModelState {
        self.read_raw()
            .as_deref()
            .map(Self::parse)
            .unwrap_or_default()
    }

    fn subscribe(&self) -> broadcast::Receiver<ModelEvent> {
        self.tx.subscribe()
    }
}
