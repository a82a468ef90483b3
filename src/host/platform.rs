/// Source of clipboard text on the host.
pub trait ClipboardSource: Send {
    /// Current clipboard text; empty when the clipboard holds no text.
    fn read_text(&mut self) -> anyhow::Result<String>;
}

/// System clipboard through `arboard`. The handle is opened lazily so a
/// headless host still starts.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<arboard::Clipboard>,
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> anyhow::Result<String> {
        if self.clipboard.is_none() {
            self.clipboard = Some(arboard::Clipboard::new()?);
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            return Ok(String::new());
        };
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Clipboard with fixed contents. `None` makes every read fail.
#[derive(Debug, Clone, Default)]
pub struct StaticClipboard(pub Option<String>);

impl ClipboardSource for StaticClipboard {
    fn read_text(&mut self) -> anyhow::Result<String> {
        self.0
            .clone()
            .ok_or_else(|| anyhow::anyhow!("clipboard unavailable"))
    }
}

pub trait Notifier: Send {
    fn notify(&mut self, title: &str, body: &str);
}

/// Native desktop notifications when built with the `notify` feature;
/// otherwise notifications only reach the UI as toasts.
#[derive(Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    #[cfg(feature = "notify")]
    fn notify(&mut self, title: &str, body: &str) {
        if let Err(e) = notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .show()
        {
            tracing::warn!("desktop notification failed: {e}");
        }
    }

    #[cfg(not(feature = "notify"))]
    fn notify(&mut self, title: &str, _body: &str) {
        tracing::debug!(%title, "desktop notifications not supported in this build");
    }
}
