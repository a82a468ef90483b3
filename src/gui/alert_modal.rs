use eframe::egui;

/// Message window with a single acknowledge button.
#[derive(Debug, Clone)]
pub struct AlertModal {
    open: bool,
    title: String,
    message: String,
}

impl Default for AlertModal {
    fn default() -> Self {
        Self {
            open: false,
            title: "Chill Pulse".into(),
            message: String::new(),
        }
    }
}

impl AlertModal {
    pub fn show_message(&mut self, message: &str) {
        self.message = message.to_string();
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        if !self.open {
            return;
        }
        let mut acknowledged = false;
        egui::Window::new(self.title.clone())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&self.message);
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });
        if acknowledged {
            self.open = false;
        }
    }
}
