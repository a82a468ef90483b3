use crate::host::bridge::HostBridge;
use crate::host::messages::{HostEvent, HostRequest, WindowId};
use crate::host::platform::{ClipboardSource, Notifier};
use crate::settings::SettingsDocument;
use crate::store::{KeyValueStore, SETTINGS_KEY, TODOS_KEY};
use anyhow::{anyhow, Context, Result};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

/// Event loop of the privileged side. Requests are handled strictly in the
/// order they arrive.
pub struct HostService {
    store: Box<dyn KeyValueStore>,
    clipboard: Box<dyn ClipboardSource>,
    notifier: Box<dyn Notifier>,
    subscribers: Vec<(WindowId, Sender<HostEvent>)>,
}

impl HostService {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        clipboard: Box<dyn ClipboardSource>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            clipboard,
            notifier,
            subscribers: Vec::new(),
        }
    }

    /// Move the service onto its own thread.
    pub fn spawn(self) -> Result<HostHandle> {
        let (tx, rx) = mpsc::channel();
        let thread = std::thread::Builder::new()
            .name("chill-pulse-host".into())
            .spawn(move || self.run(rx))
            .context("spawning host thread")?;
        Ok(HostHandle {
            tx,
            thread: Some(thread),
            next_window: AtomicU64::new(1),
        })
    }

    fn run(mut self, rx: Receiver<HostRequest>) {
        tracing::info!("host service started");
        while let Ok(request) = rx.recv() {
            if !self.handle(request) {
                break;
            }
        }
        tracing::info!("host service stopped");
    }

    /// Handle one request. Returns `false` once the loop should stop.
    pub fn handle(&mut self, request: HostRequest) -> bool {
        match request {
            HostRequest::LoadSettings { reply } => {
                let result = self.load_settings();
                if let Err(e) = &result {
                    tracing::error!("failed to load settings: {e:#}");
                }
                let _ = reply.send(result);
            }
            HostRequest::SaveSettings { document } => self.save_settings(document),
            HostRequest::LoadTodos { reply } => {
                let _ = reply.send(self.store.get(TODOS_KEY, json!([])));
            }
            HostRequest::ShowNotification {
                window,
                title,
                body,
            } => {
                tracing::info!(window, %title, %body, "notification");
                self.notifier.notify(&title, &body);
                self.send_to(window, HostEvent::Notification { title, body });
            }
            HostRequest::ReadClipboardText { reply } => {
                let result = self.clipboard.read_text();
                if let Err(e) = &result {
                    tracing::warn!("clipboard read failed: {e:#}");
                }
                let _ = reply.send(result);
            }
            HostRequest::Subscribe { window, events } => self.subscribers.push((window, events)),
            HostRequest::Shutdown => return false,
        }
        true
    }

    fn load_settings(&self) -> Result<SettingsDocument> {
        let stored = self
            .store
            .get(SETTINGS_KEY, json!({}))
            .context("reading stored settings")?;
        let doc = SettingsDocument::from_stored(&stored);
        tracing::debug!(widgets = doc.active_widgets.len(), "settings loaded");
        Ok(doc)
    }

    fn save_settings(&mut self, document: SettingsDocument) {
        let value = match document.to_value() {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("failed to serialize settings: {e:#}");
                return;
            }
        };
        if let Err(e) = self.store.set(SETTINGS_KEY, value) {
            // Not rebroadcast: windows keep their in-memory copy, which is
            // ahead of what is on disk until the next successful save.
            tracing::error!("failed to persist settings: {e:#}");
            return;
        }
        tracing::debug!("settings saved; broadcasting");
        self.broadcast(HostEvent::SettingsUpdated(document));
    }

    fn broadcast(&mut self, event: HostEvent) {
        self.subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    fn send_to(&mut self, window: WindowId, event: HostEvent) {
        let Some(index) = self.subscribers.iter().position(|(id, _)| *id == window) else {
            tracing::debug!(window, "event for a window that is not subscribed");
            return;
        };
        if self.subscribers[index].1.send(event).is_err() {
            self.subscribers.remove(index);
        }
    }
}

/// Owner's handle to the running host thread.
pub struct HostHandle {
    tx: Sender<HostRequest>,
    thread: Option<JoinHandle<()>>,
    next_window: AtomicU64,
}

impl HostHandle {
    /// Open a new window-side connection subscribed to broadcasts.
    pub fn connect(&self) -> Result<HostBridge> {
        let window = self.next_window.fetch_add(1, Ordering::Relaxed);
        let (events_tx, events_rx) = mpsc::channel();
        self.tx
            .send(HostRequest::Subscribe {
                window,
                events: events_tx,
            })
            .map_err(|_| anyhow!("host service is not running"))?;
        Ok(HostBridge::new(window, self.tx.clone(), events_rx))
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.tx.send(HostRequest::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("host thread panicked");
            }
        }
    }
}

impl Drop for HostHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
