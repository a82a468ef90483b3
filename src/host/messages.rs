use crate::settings::SettingsDocument;
use serde_json::Value;
use std::sync::mpsc::Sender;

/// Identifies one connected window. Assigned by `HostHandle::connect`.
pub type WindowId = u64;

/// Messages a UI window sends to the host.
pub enum HostRequest {
    LoadSettings {
        reply: Sender<anyhow::Result<SettingsDocument>>,
    },
    /// Persist and rebroadcast. No direct reply.
    SaveSettings {
        document: SettingsDocument,
    },
    LoadTodos {
        reply: Sender<anyhow::Result<Value>>,
    },
    /// Shown natively and echoed back to the requesting window only.
    ShowNotification {
        window: WindowId,
        title: String,
        body: String,
    },
    ReadClipboardText {
        reply: Sender<anyhow::Result<String>>,
    },
    Subscribe {
        window: WindowId,
        events: Sender<HostEvent>,
    },
    Shutdown,
}

/// Messages the host pushes to subscribed windows.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The canonical copy that was just persisted.
    SettingsUpdated(SettingsDocument),
    Notification { title: String, body: String },
}
