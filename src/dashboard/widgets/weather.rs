use super::{WidgetContext, WidgetHandle};
use crate::common::{Liveness, Pending, PendingState, Ticker};
use crate::dashboard::container::ElementHandle;
use crate::settings::{SettingsDocument, TemperatureUnit};
use anyhow::Result;
use eframe::egui;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

const POLL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub location: String,
    pub api_key: String,
    pub unit: TemperatureUnit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub name: String,
    pub temperature: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOutcome {
    Report(WeatherReport),
    /// The provider answered with a non-success status.
    Rejected { message: Option<String> },
    /// No usable answer at all.
    Failed { reason: String },
}

pub trait WeatherProvider: Send + Sync {
    fn fetch(&self, query: &WeatherQuery) -> WeatherOutcome;
}

#[derive(Deserialize)]
struct ReportBody {
    name: String,
    main: MainBody,
    weather: Vec<ConditionBody>,
}

#[derive(Deserialize)]
struct MainBody {
    temp: f64,
}

#[derive(Deserialize)]
struct ConditionBody {
    description: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Interpret a provider response body.
pub fn parse_weather_response(success: bool, body: &str) -> WeatherOutcome {
    if !success {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message);
        return WeatherOutcome::Rejected { message };
    }
    match serde_json::from_str::<ReportBody>(body) {
        Ok(report) => match report.weather.into_iter().next() {
            Some(condition) => WeatherOutcome::Report(WeatherReport {
                name: report.name,
                temperature: report.main.temp,
                description: condition.description,
            }),
            None => WeatherOutcome::Failed {
                reason: "response has no weather conditions".into(),
            },
        },
        Err(e) => WeatherOutcome::Failed {
            reason: format!("malformed response: {e}"),
        },
    }
}

/// Current-weather endpoint of OpenWeatherMap.
pub struct OpenWeatherMap {
    base_url: String,
    client: Client,
}

impl OpenWeatherMap {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("chill-pulse weather")
            .build()?;
        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }
}

impl WeatherProvider for OpenWeatherMap {
    fn fetch(&self, query: &WeatherQuery) -> WeatherOutcome {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query.location.as_str()),
                ("appid", query.api_key.as_str()),
                ("units", query.unit.as_str()),
            ])
            .send();
        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(location = %query.location, "weather request failed: {e}");
                return WeatherOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        let success = resp.status().is_success();
        match resp.text() {
            Ok(body) => parse_weather_response(success, &body),
            Err(e) => WeatherOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

pub struct WeatherWidget {
    info: String,
    details: String,
    unit: TemperatureUnit,
    ticker: Ticker,
    pending: Option<Pending<WeatherOutcome>>,
    alive: Liveness,
    element: ElementHandle,
}

impl WeatherWidget {
    pub fn init(ctx: &mut WidgetContext<'_>) -> Self {
        let mut widget = Self {
            info: "Loading weather...".into(),
            details: String::new(),
            unit: ctx.document().weather.unit,
            ticker: Ticker::start(POLL, ctx.now()),
            pending: None,
            alive: Liveness::new(),
            element: ctx.element().clone(),
        };
        widget.refresh(ctx);
        widget
    }

    /// Start a fetch using the settings as they are right now.
    fn refresh(&mut self, ctx: &mut WidgetContext<'_>) {
        // Any fetch still running was started under older settings; its reply
        // is dropped unread.
        self.pending = None;
        let weather = &ctx.document().weather;
        if weather.api_key.trim().is_empty() {
            self.show("API Key Missing", "");
            return;
        }
        if weather.location.trim().is_empty() {
            self.show("Location Missing", "");
            return;
        }
        let query = WeatherQuery {
            location: weather.location.clone(),
            api_key: weather.api_key.clone(),
            unit: weather.unit,
        };
        self.unit = query.unit;
        let provider = ctx.weather();
        tracing::debug!(location = %query.location, "fetching weather");
        self.pending = Some(Pending::spawn("weather-fetch", move || {
            provider.fetch(&query)
        }));
    }

    fn show(&mut self, info: &str, details: &str) {
        self.info = info.to_string();
        self.details = details.to_string();
    }

    fn apply_outcome(&mut self, outcome: WeatherOutcome) {
        match outcome {
            WeatherOutcome::Report(report) => {
                let degrees = report.temperature.round() as i64;
                self.info = format!("{degrees}{}", self.unit.symbol());
                self.details = format!("{}: {}", report.name, report.description);
            }
            WeatherOutcome::Rejected { message } => {
                let message = message.unwrap_or_else(|| "Unknown error".into());
                self.show(&format!("Error: {message}"), "");
            }
            WeatherOutcome::Failed { reason } => {
                tracing::warn!("weather fetch failed: {reason}");
                self.show("Failed to fetch", "");
            }
        }
    }

    fn poll_pending(&mut self) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        let outcome = match pending.poll() {
            PendingState::Waiting => {
                self.pending = Some(pending);
                return;
            }
            PendingState::Ready(outcome) => outcome,
            PendingState::Lost => WeatherOutcome::Failed {
                reason: "weather worker exited without answering".into(),
            },
        };
        if !self.alive.is_alive() || !self.element.is_attached() {
            tracing::debug!("weather reply arrived after removal; dropped");
            return;
        }
        self.apply_outcome(outcome);
    }
}

impl WidgetHandle for WeatherWidget {
    fn update(&mut self, ctx: &mut WidgetContext<'_>) {
        self.refresh(ctx);
    }

    fn cleanup(&mut self) {
        self.ticker.cancel();
        self.alive.kill();
    }

    fn tick(&mut self, ctx: &mut WidgetContext<'_>) {
        if self.ticker.due_ticks(ctx.now()) > 0 {
            self.refresh(ctx);
        }
        self.poll_pending();
    }

    fn text_content(&self, _doc: &SettingsDocument) -> Vec<String> {
        let mut lines = vec![self.info.clone()];
        if !self.details.is_empty() {
            lines.push(self.details.clone());
        }
        lines
    }

    fn ui(&mut self, ui: &mut egui::Ui, _ctx: &mut WidgetContext<'_>) {
        ui.label(egui::RichText::new(&self.info).size(24.0));
        if !self.details.is_empty() {
            ui.label(&self.details);
        }
    }
}
