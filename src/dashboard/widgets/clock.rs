use super::{WidgetContext, WidgetHandle};
use crate::common::Ticker;
use crate::settings::SettingsDocument;
use chrono::{Local, NaiveTime};
use eframe::egui;
use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

pub struct ClockWidget {
    ticker: Ticker,
    text: String,
}

impl ClockWidget {
    pub fn init(ctx: &mut WidgetContext<'_>) -> Self {
        Self {
            ticker: Ticker::start(TICK, ctx.now()),
            text: format_time(Local::now().time()),
        }
    }
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

impl WidgetHandle for ClockWidget {
    fn cleanup(&mut self) {
        self.ticker.cancel();
    }

    fn tick(&mut self, ctx: &mut WidgetContext<'_>) {
        if self.ticker.due_ticks(ctx.now()) > 0 {
            self.text = format_time(Local::now().time());
        }
    }

    fn text_content(&self, _doc: &SettingsDocument) -> Vec<String> {
        vec![self.text.clone()]
    }

    fn ui(&mut self, ui: &mut egui::Ui, _ctx: &mut WidgetContext<'_>) {
        ui.label(egui::RichText::new(&self.text).size(32.0).monospace());
    }
}
