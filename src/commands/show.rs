//! The `show-config` command.

use crate::model::CodeModelSource;
use crate::notify::Notifier;
use crate::projector::derive_active_label;

/// Shows the active CMake configuration label as a notification.
/// Always succeeds: missing model data renders as the "null" label.
pub fn show_active_config<S: CodeModelSource, N: Notifier>(source: &S, notifier: &N) {
    let state = source.state();
    let label = derive_active_label(
        state.code_model.as_ref(),
        state.default_build_target.as_deref(),
        state.selected_build_type.as_deref(),
    );
    notifier.info(&format!("Active CMake Configuration [{}]", label));
}
