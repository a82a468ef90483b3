mod alert_modal;
mod settings_panel;
mod widget_picker;

pub use alert_modal::AlertModal;
pub use settings_panel::{SettingsForm, SettingsPanel, SettingsPanelResult};
pub use widget_picker::WidgetPicker;

use crate::background::BackgroundKind;
use crate::dashboard::appearance::BACKGROUND_BRIGHTNESS;
use crate::dashboard::Dashboard;
use crate::sync::LoadOutcome;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::time::{Duration, Instant};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load settings. Using default settings.";
const TOAST_SECONDS: f64 = 6.0;
const TITLEBAR_HEIGHT: f32 = 32.0;

fn push_toast(toasts: &mut Toasts, text: String, kind: ToastKind) {
    toasts.add(Toast {
        text: text.into(),
        kind,
        options: ToastOptions::default().duration_in_seconds(TOAST_SECONDS),
    });
}

pub struct DashboardApp {
    dashboard: Dashboard,
    settings_panel: SettingsPanel,
    picker: WidgetPicker,
    alert: AlertModal,
    toasts: Toasts,
    always_on_top: bool,
}

impl DashboardApp {
    pub fn new(mut dashboard: Dashboard, always_on_top: bool) -> Self {
        let mut alert = AlertModal::default();
        if let LoadOutcome::FellBack { .. } = dashboard.start() {
            alert.show_message(LOAD_FAILED_MESSAGE);
        }
        Self {
            dashboard,
            settings_panel: SettingsPanel::default(),
            picker: WidgetPicker::default(),
            alert,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [-10.0, TITLEBAR_HEIGHT + 10.0]),
            always_on_top,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn alert(&self) -> &AlertModal {
        &self.alert
    }

    pub fn settings_panel(&self) -> &SettingsPanel {
        &self.settings_panel
    }

    pub fn open_settings(&mut self) {
        self.settings_panel.open_with(self.dashboard.document());
    }

    /// Apply host broadcasts. Notices become toasts and an open settings form
    /// follows a replaced document.
    pub fn sync_from_host(&mut self) {
        let before = self.dashboard.revision();
        let notices = self.dashboard.process_host_events();
        if self.dashboard.revision() != before && self.settings_panel.is_open() {
            self.settings_panel.refresh_from(self.dashboard.document());
        }
        for notice in notices {
            push_toast(
                &mut self.toasts,
                format!("{}\n{}", notice.title, notice.body),
                ToastKind::Info,
            );
        }
    }

    fn titlebar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("titlebar")
            .exact_height(TITLEBAR_HEIGHT)
            .frame(egui::Frame::none().fill(egui::Color32::from_black_alpha(140)))
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    let drag = ui.interact(
                        ui.max_rect(),
                        egui::Id::new("titlebar_drag"),
                        egui::Sense::click_and_drag(),
                    );
                    if drag.drag_started() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
                    }
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new("Chill Pulse").strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("✕").on_hover_text("Close").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                        let maximized = ctx.input(|i| i.viewport().maximized.unwrap_or(false));
                        if ui.button("□").on_hover_text("Maximize").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Maximized(!maximized));
                        }
                        if ui.button("—").on_hover_text("Minimize").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
                        }
                        if ui
                            .selectable_label(self.always_on_top, "📌")
                            .on_hover_text("Always on top")
                            .clicked()
                        {
                            self.always_on_top = !self.always_on_top;
                            let level = if self.always_on_top {
                                egui::viewport::WindowLevel::AlwaysOnTop
                            } else {
                                egui::viewport::WindowLevel::Normal
                            };
                            ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(level));
                        }
                        ui.separator();
                        if ui.button("⚙").on_hover_text("Settings").clicked() {
                            self.open_settings();
                        }
                        if ui.button("+").on_hover_text("Add widget").clicked() {
                            self.picker.open();
                        }
                    });
                });
            });
    }

    fn paint_background(&self, ui: &egui::Ui) {
        let rect = ui.max_rect();
        let painter = ui.painter();
        painter.rect_filled(rect, 0.0, egui::Color32::from_black_alpha(200));
        let Some(bg) = &self.dashboard.appearance().background else {
            return;
        };
        // Blur has no effect on a flat fill.
        let tint = match bg.entry.kind {
            BackgroundKind::Video => egui::Color32::from_rgb(40, 70, 110),
            BackgroundKind::Image => egui::Color32::from_rgb(70, 90, 60),
        };
        painter.rect_filled(rect, 0.0, tint.gamma_multiply(bg.opacity * BACKGROUND_BRIGHTNESS));
        painter.text(
            rect.right_bottom() - egui::vec2(8.0, 8.0),
            egui::Align2::RIGHT_BOTTOM,
            bg.entry.asset_path(),
            egui::FontId::proportional(11.0),
            egui::Color32::from_white_alpha(60),
        );
    }
}

impl eframe::App for DashboardApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_from_host();
        self.dashboard.tick(Instant::now());

        self.titlebar(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::none().inner_margin(16.0))
            .show(ctx, |ui| {
                self.paint_background(ui);
                let welcome = self.dashboard.appearance().welcome_message.clone();
                if !welcome.is_empty() {
                    ui.heading(egui::RichText::new(welcome).size(28.0));
                    ui.add_space(12.0);
                }
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| self.dashboard.ui(ui));
            });

        if let SettingsPanelResult::Saved(form) = self.settings_panel.ui(ctx, self.dashboard.catalog()) {
            self.dashboard.save_settings_with(|doc| form.merge_into(doc));
        }
        if let Some(tag) = self.picker.ui(ctx, self.dashboard.registry()) {
            if self.dashboard.add_widget(&tag, None).is_none() {
                push_toast(
                    &mut self.toasts,
                    format!("Unknown widget type: {tag}"),
                    ToastKind::Error,
                );
            }
        }
        self.alert.ui(ctx);
        self.toasts.show(ctx);

        ctx.request_repaint_after(Duration::from_millis(500));
    }
}
