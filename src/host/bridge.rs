use crate::common::Pending;
use crate::host::messages::{HostEvent, HostRequest, WindowId};
use crate::settings::SettingsDocument;
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Settings channel between one UI window and the host.
pub trait HostLink {
    /// Request/response: blocks until the host answers.
    fn load_settings(&self) -> Result<SettingsDocument>;
    /// Fire-and-forget. An `Err` only means the request could not be sent.
    fn save_settings(&self, document: SettingsDocument) -> Result<()>;
    /// Next broadcast from the host, if one is waiting.
    fn next_event(&self) -> Option<HostEvent>;
}

/// Platform services widgets may call.
pub trait PlatformApi {
    fn show_notification(&self, title: &str, body: &str);
    fn read_clipboard_text(&self) -> Pending<Result<String>>;
}

/// Window-side connection to the host service.
pub struct HostBridge {
    window: WindowId,
    tx: Sender<HostRequest>,
    events: Receiver<HostEvent>,
}

impl HostBridge {
    pub(crate) fn new(
        window: WindowId,
        tx: Sender<HostRequest>,
        events: Receiver<HostEvent>,
    ) -> Self {
        Self { window, tx, events }
    }

    /// Platform handle sharing this bridge's request channel.
    pub fn platform(&self) -> HostPlatform {
        HostPlatform {
            window: self.window,
            tx: self.tx.clone(),
        }
    }

    /// Legacy global to-do list.
    pub fn load_todos(&self) -> Result<Value> {
        request(&self.tx, |reply| HostRequest::LoadTodos { reply })
    }
}

fn request<T>(
    tx: &Sender<HostRequest>,
    make: impl FnOnce(Sender<Result<T>>) -> HostRequest,
) -> Result<T> {
    let (reply_tx, reply_rx) = mpsc::channel();
    tx.send(make(reply_tx))
        .map_err(|_| anyhow!("host service is not running"))?;
    reply_rx
        .recv()
        .map_err(|_| anyhow!("host service dropped the request"))?
}

impl HostLink for HostBridge {
    fn load_settings(&self) -> Result<SettingsDocument> {
        request(&self.tx, |reply| HostRequest::LoadSettings { reply })
    }

    fn save_settings(&self, document: SettingsDocument) -> Result<()> {
        self.tx
            .send(HostRequest::SaveSettings { document })
            .map_err(|_| anyhow!("host service is not running"))
    }

    fn next_event(&self) -> Option<HostEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::debug!("host event channel closed");
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct HostPlatform {
    window: WindowId,
    tx: Sender<HostRequest>,
}

impl PlatformApi for HostPlatform {
    fn show_notification(&self, title: &str, body: &str) {
        let sent = self.tx.send(HostRequest::ShowNotification {
            window: self.window,
            title: title.to_string(),
            body: body.to_string(),
        });
        if sent.is_err() {
            tracing::warn!(%title, "host unavailable; notification dropped");
        }
    }

    fn read_clipboard_text(&self) -> Pending<Result<String>> {
        let (reply, pending) = Pending::channel();
        // On failure the reply sender is dropped with the request and the
        // caller sees the pending read as lost.
        if self
            .tx
            .send(HostRequest::ReadClipboardText { reply })
            .is_err()
        {
            tracing::warn!("host unavailable; clipboard read dropped");
        }
        pending
    }
}
