use crate::dashboard::WidgetRegistry;
use eframe::egui;

/// Lists every registered widget type; picking one returns its tag.
#[derive(Default)]
pub struct WidgetPicker {
    open: bool,
}

impl WidgetPicker {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn ui(&mut self, ctx: &egui::Context, registry: &WidgetRegistry) -> Option<String> {
        if !self.open {
            return None;
        }
        let mut chosen = None;
        let mut open = true;
        egui::Window::new("Add Widget")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                for def in registry.definitions() {
                    if ui
                        .add_sized([200.0, 24.0], egui::Button::new(def.title()))
                        .clicked()
                    {
                        chosen = Some(def.tag().to_string());
                    }
                }
            });
        if chosen.is_some() || !open {
            self.open = false;
        }
        chosen
    }
}
