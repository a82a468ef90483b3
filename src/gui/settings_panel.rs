use crate::background::BackgroundCatalog;
use crate::settings::{SettingsDocument, TemperatureUnit};
use eframe::egui;

/// Editable copy of the user-facing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    pub welcome_message: String,
    pub background_file: String,
    pub background_blur: u32,
    pub background_opacity: f32,
    pub location: String,
    pub api_key: String,
    pub unit: TemperatureUnit,
}

impl SettingsForm {
    pub fn from_document(doc: &SettingsDocument) -> Self {
        Self {
            welcome_message: doc.welcome_message.clone(),
            background_file: doc.background_file.clone(),
            background_blur: doc.background_blur.clamp(0.0, 20.0).round() as u32,
            background_opacity: doc.background_opacity.clamp(0.0, 1.0),
            location: doc.weather.location.clone(),
            api_key: doc.weather.api_key.clone(),
            unit: doc.weather.unit,
        }
    }

    /// Write the form over `doc`. Widgets and their data are left alone.
    pub fn merge_into(&self, doc: &mut SettingsDocument) {
        doc.welcome_message = self.welcome_message.trim().to_string();
        doc.background_file = self.background_file.clone();
        doc.background_blur = self.background_blur as f32;
        doc.background_opacity = self.background_opacity;
        doc.weather.location = self.location.trim().to_string();
        doc.weather.api_key = self.api_key.trim().to_string();
        doc.weather.unit = self.unit;
    }
}

pub enum SettingsPanelResult {
    None,
    Saved(SettingsForm),
    Cancelled,
}

#[derive(Default)]
pub struct SettingsPanel {
    open: bool,
    form: Option<SettingsForm>,
}

impl SettingsPanel {
    pub fn open_with(&mut self, doc: &SettingsDocument) {
        self.form = Some(SettingsForm::from_document(doc));
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn form(&self) -> Option<&SettingsForm> {
        self.form.as_ref()
    }

    /// Reload the open form from a document that replaced the one it was
    /// opened with. Unsaved edits in the form are lost.
    pub fn refresh_from(&mut self, doc: &SettingsDocument) {
        if self.open {
            self.form = Some(SettingsForm::from_document(doc));
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context, catalog: &BackgroundCatalog) -> SettingsPanelResult {
        if !self.open {
            return SettingsPanelResult::None;
        }
        let Some(form) = self.form.as_mut() else {
            self.open = false;
            return SettingsPanelResult::None;
        };
        let mut save = false;
        let mut cancel = false;
        let mut open = true;
        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 40.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.heading("General");
                ui.horizontal(|ui| {
                    ui.label("Welcome message");
                    ui.text_edit_singleline(&mut form.welcome_message);
                });
                ui.separator();
                ui.heading("Background");
                egui::ComboBox::from_label("Background")
                    .selected_text(if form.background_file.is_empty() {
                        "None"
                    } else {
                        form.background_file.as_str()
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut form.background_file, String::new(), "None");
                        for entry in catalog.entries() {
                            ui.selectable_value(
                                &mut form.background_file,
                                entry.name.clone(),
                                &entry.name,
                            );
                        }
                    });
                ui.add(egui::Slider::new(&mut form.background_blur, 0..=20).text("Blur").suffix("px"));
                ui.add(egui::Slider::new(&mut form.background_opacity, 0.0..=1.0).text("Opacity"));
                ui.separator();
                ui.heading("Weather");
                ui.horizontal(|ui| {
                    ui.label("Location");
                    ui.text_edit_singleline(&mut form.location);
                });
                ui.horizontal(|ui| {
                    ui.label("API key");
                    ui.add(egui::TextEdit::singleline(&mut form.api_key).password(true));
                });
                ui.horizontal(|ui| {
                    ui.label("Units");
                    ui.radio_value(&mut form.unit, TemperatureUnit::Metric, "Metric (°C)");
                    ui.radio_value(&mut form.unit, TemperatureUnit::Imperial, "Imperial (°F)");
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });
        if save {
            self.open = false;
            return match self.form.take() {
                Some(form) => SettingsPanelResult::Saved(form),
                None => SettingsPanelResult::None,
            };
        }
        if cancel || !open {
            self.open = false;
            self.form = None;
            return SettingsPanelResult::Cancelled;
        }
        SettingsPanelResult::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{WidgetId, WidgetRef};
    use serde_json::json;

    #[test]
    fn merge_trims_text_and_keeps_widgets() {
        let mut doc = SettingsDocument::default();
        doc.active_widgets
            .push(WidgetRef::new("w1".into(), "todo", json!({})));
        doc.widgets.insert(WidgetId::from("w1"), json!({"todos": []}));

        let mut form = SettingsForm::from_document(&doc);
        form.welcome_message = "  hi there ".into();
        form.location = " Paris ".into();
        form.unit = TemperatureUnit::Imperial;
        form.background_blur = 4;
        form.merge_into(&mut doc);

        assert_eq!(doc.welcome_message, "hi there");
        assert_eq!(doc.weather.location, "Paris");
        assert_eq!(doc.weather.unit, TemperatureUnit::Imperial);
        assert_eq!(doc.background_blur, 4.0);
        assert_eq!(doc.active_widgets.len(), 1);
        assert!(doc.widget_data(&"w1".into()).is_some());
    }

    #[test]
    fn form_starts_from_document_values() {
        let doc = SettingsDocument::default();
        let form = SettingsForm::from_document(&doc);
        assert_eq!(form.background_blur, 10);
        assert_eq!(form.background_opacity, 0.5);
        assert_eq!(form.location, "London");
    }

    #[test]
    fn refresh_only_touches_an_open_form() {
        let mut panel = SettingsPanel::default();
        let mut newer = SettingsDocument::default();
        newer.weather.location = "Oslo".into();

        panel.refresh_from(&newer);
        assert!(panel.form().is_none());

        panel.open_with(&SettingsDocument::default());
        panel.refresh_from(&newer);
        assert!(panel.is_open());
        assert_eq!(panel.form().map(|f| f.location.as_str()), Some("Oslo"));
    }
}
