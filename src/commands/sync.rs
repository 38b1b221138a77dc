//! The `sync` and `watch` commands: project the active configuration into
//! the C/C++ tooling plugin's configuration file.

use anyhow::Result;
use log::{debug, info};
use std::path::Path;
use tokio::sync::broadcast::error::RecvError;

use crate::model::CodeModelSource;
use crate::notify::Notifier;
use crate::projector::derive_active_label;
use crate::properties::CppProperties;
use crate::runtime::Runtime;

/// One projection pass: derive the active label and rewrite the properties
/// file so the matching entry sits at index 0. A missing properties file is
/// a no-op; missing model data degrades to the "null" label, which matches
/// no entry and leaves the order unchanged.
#[tracing::instrument(skip(runtime, source, properties_path))]
pub fn sync<R, S>(runtime: &R, source: &S, properties_path: &Path) -> Result<()>
where
    R: Runtime,
    S: CodeModelSource,
{
    let state = source.state();
    let label = derive_active_label(
        state.code_model.as_ref(),
        state.default_build_target.as_deref(),
        state.selected_build_type.as_deref(),
    );
    debug!("Active configuration label: {}", label);

    if !runtime.exists(properties_path) {
        debug!("{:?} does not exist, nothing to sync", properties_path);
        return Ok(());
    }

    let mut properties = CppProperties::load(runtime, properties_path)?;
    properties.activate(&label);
    properties.save(runtime, properties_path)?;

    info!("Synced {:?} (active: {})", properties_path, label);
    Ok(())
}

/// Re-runs [`sync`] on every model change until the event channel closes.
/// Individual sync failures are reported and do not stop the loop.
pub async fn watch<R, S, N>(
    runtime: &R,
    source: &S,
    notifier: &N,
    properties_path: &Path,
) -> Result<()>
where
    R: Runtime,
    S: CodeModelSource,
    N: Notifier,
{
    let mut events = source.subscribe();

    // First update happens immediately, before any event arrives.
    if let Err(e) = sync(runtime, source, properties_path) {
        notifier.error(&format!("Sync failed: {:#}", e));
    }

    loop {
        match events.recv().await {
            Ok(event) => {
                debug!("Model event: {:?}", event);
                if let Err(e) = sync(runtime, source, properties_path) {
                    notifier.error(&format!("Sync failed: {:#}", e));
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!("Skipped {} model events, syncing once", skipped);
                if let Err(e) = sync(runtime, source, properties_path) {
                    notifier.error(&format!("Sync failed: {:#}", e));
                }
            }
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}
