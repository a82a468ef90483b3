use super::{WidgetContext, WidgetHandle};
use crate::common::{Liveness, Pending, PendingState};
use crate::dashboard::container::ElementHandle;
use crate::settings::SettingsDocument;
use anyhow::Result;

const EMPTY: &str = "Clipboard is empty or contains non-text data.";
const FAILED: &str = "Error reading clipboard.";

/// Snapshot of the clipboard text taken once when the widget is created.
pub struct ClipboardWidget {
    text: String,
    pending: Option<Pending<Result<String>>>,
    alive: Liveness,
    element: ElementHandle,
}

impl ClipboardWidget {
    pub fn init(ctx: &mut WidgetContext<'_>) -> Self {
        Self {
            text: "Loading clipboard...".into(),
            pending: Some(ctx.platform().read_clipboard_text()),
            alive: Liveness::new(),
            element: ctx.element().clone(),
        }
    }
}

impl WidgetHandle for ClipboardWidget {
    fn cleanup(&mut self) {
        self.alive.kill();
    }

    fn tick(&mut self, _ctx: &mut WidgetContext<'_>) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        let result = match pending.poll() {
            PendingState::Waiting => {
                self.pending = Some(pending);
                return;
            }
            PendingState::Ready(result) => result,
            PendingState::Lost => Err(anyhow::anyhow!("clipboard read was dropped")),
        };
        if !self.alive.is_alive() || !self.element.is_attached() {
            return;
        }
        self.text = match result {
            Ok(text) if text.is_empty() => EMPTY.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("failed to read clipboard: {e:#}");
                FAILED.to_string()
            }
        };
    }

    fn text_content(&self, _doc: &SettingsDocument) -> Vec<String> {
        vec![self.text.clone()]
    }
}
