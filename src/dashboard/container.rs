//! Retained model of the dashboard container: the ordered panels the GUI
//! draws, one per live widget.

use crate::common::Liveness;
use crate::settings::WidgetId;

/// What a widget definition generates for a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelMarkup {
    pub element_id: String,
    pub heading: String,
}

/// Handle to a panel that outlives its attachment. Async completions check
/// `is_attached` before writing anything.
#[derive(Debug, Clone)]
pub struct ElementHandle {
    element_id: String,
    attached: Liveness,
}

impl ElementHandle {
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_alive()
    }
}

#[derive(Debug)]
pub struct Panel {
    widget: WidgetId,
    markup: PanelMarkup,
    remove_binding: Option<WidgetId>,
    attached: Liveness,
}

impl Panel {
    pub fn widget(&self) -> &WidgetId {
        &self.widget
    }

    pub fn element_id(&self) -> &str {
        &self.markup.element_id
    }

    pub fn heading(&self) -> &str {
        &self.markup.heading
    }

    /// Widget removed when this panel's close control is pressed.
    pub fn remove_binding(&self) -> Option<&WidgetId> {
        self.remove_binding.as_ref()
    }

    fn detach(&self) {
        self.attached.kill();
    }
}

#[derive(Debug, Default)]
pub struct Container {
    panels: Vec<Panel>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a panel at the end.
    pub fn insert_end(&mut self, widget: &WidgetId, markup: PanelMarkup) -> ElementHandle {
        if self.remove(&markup.element_id) {
            tracing::warn!(element = %markup.element_id, "replaced panel with duplicate element id");
        }
        let attached = Liveness::new();
        let handle = ElementHandle {
            element_id: markup.element_id.clone(),
            attached: attached.clone(),
        };
        self.panels.push(Panel {
            widget: widget.clone(),
            markup,
            remove_binding: None,
            attached,
        });
        handle
    }

    pub fn bind_remove_control(&mut self, element_id: &str, widget: &WidgetId) -> bool {
        match self.panels.iter_mut().find(|p| p.element_id() == element_id) {
            Some(panel) => {
                panel.remove_binding = Some(widget.clone());
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, element_id: &str) -> bool {
        let Some(index) = self.panels.iter().position(|p| p.element_id() == element_id) else {
            return false;
        };
        let panel = self.panels.remove(index);
        panel.detach();
        true
    }

    pub fn clear(&mut self) {
        for panel in self.panels.drain(..) {
            panel.detach();
        }
    }

    pub fn contains(&self, element_id: &str) -> bool {
        self.panels.iter().any(|p| p.element_id() == element_id)
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
