use super::{WidgetContext, WidgetHandle};
use crate::common::Ticker;
use crate::settings::SettingsDocument;
use chrono::{Local, NaiveDate};
use eframe::egui;
use std::time::Duration;

const TICK: Duration = Duration::from_secs(60);

pub struct DateWidget {
    ticker: Ticker,
    text: String,
}

impl DateWidget {
    pub fn init(ctx: &mut WidgetContext<'_>) -> Self {
        Self {
            ticker: Ticker::start(TICK, ctx.now()),
            text: format_date(Local::now().date_naive()),
        }
    }
}

/// Long form, e.g. `Monday, March 4, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

impl WidgetHandle for DateWidget {
    fn cleanup(&mut self) {
        self.ticker.cancel();
    }

    fn tick(&mut self, ctx: &mut WidgetContext<'_>) {
        if self.ticker.due_ticks(ctx.now()) > 0 {
            self.text = format_date(Local::now().date_naive());
        }
    }

    fn text_content(&self, _doc: &SettingsDocument) -> Vec<String> {
        vec![self.text.clone()]
    }

    fn ui(&mut self, ui: &mut egui::Ui, _ctx: &mut WidgetContext<'_>) {
        ui.label(egui::RichText::new(&self.text).size(18.0));
    }
}
