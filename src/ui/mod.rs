pub mod dashboard;
pub mod mapping_form;
pub mod rule_form;
pub mod sidebar;
pub mod widgets;
pub mod wizard;

use crate::bridge::UiCommand;
use tokio::sync::mpsc::UnboundedSender;

/// Forwards an action's command, if it produced one, to the background runtime.
pub fn dispatch(cmd_tx: &UnboundedSender<UiCommand>, command: Option<UiCommand>) {
    if let Some(command) = command {
        if let Err(e) = cmd_tx.send(command) {
            tracing::warn!("Background runtime is gone, dropping command: {}", e);
        }
    }
}
