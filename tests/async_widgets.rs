
use chill_pulse::dashboard::widgets::{WeatherOutcome, WeatherReport};
use chill_pulse::dashboard::WidgetRegistry;
use chill_pulse::settings::{SettingsDocument, TemperatureUnit, WidgetId};
use harness::{harness_with, tick_until, Harness};
use std::time::Duration;

fn weather_doc(api_key: &str, location: &str) -> SettingsDocument {
    let mut doc = SettingsDocument::default();
    doc.background_file = "a.mp4".into();
    doc.weather.api_key = api_key.into();
    doc.weather.location = location.into();
    doc
}

fn with_weather(doc: SettingsDocument, outcome: WeatherOutcome) -> (Harness, WidgetId) {
    let mut h = harness_with(Some(doc), WidgetRegistry::with_defaults(), outcome, None);
    h.dashboard.start();
    let id = h
        .dashboard
        .add_widget("weather", None)
        .map(|w| w.id().clone())
        .unwrap();
    (h, id)
}

fn lines(text: &[&str]) -> Option<Vec<String>> {
    Some(text.iter().map(|s| s.to_string()).collect())
}

fn paris() -> WeatherOutcome {
    WeatherOutcome::Report(WeatherReport {
        name: "Paris".into(),
        temperature: 71.6,
        description: "clear sky".into(),
    })
}

#[test]
fn missing_key_is_reported_before_location() {
    let (h, id) = with_weather(weather_doc("", ""), paris());
    assert_eq!(h.dashboard.text_content(&id), lines(&["API Key Missing"]));
    assert!(h.weather.queries.lock().unwrap().is_empty());
}

#[test]
fn missing_location_is_reported() {
    let (h, id) = with_weather(weather_doc("key", "  "), paris());
    assert_eq!(h.dashboard.text_content(&id), lines(&["Location Missing"]));
}

#[test]
fn report_uses_live_unit() {
    let mut doc = weather_doc("key", "Paris");
    doc.weather.unit = TemperatureUnit::Imperial;
    let (mut h, id) = with_weather(doc, paris());
    assert_eq!(h.dashboard.text_content(&id), lines(&["Loading weather..."]));

    let expected = lines(&["72°F", "Paris: clear sky"]);
    assert!(tick_until(&mut h.dashboard, |d| d.text_content(&id) == expected));
    let queries = h.weather.queries.lock().unwrap();
    assert_eq!(queries[0].unit, TemperatureUnit::Imperial);
    assert_eq!(queries[0].api_key, "key");
}

#[test]
fn provider_errors_are_shown_inline() {
    let (mut h, id) = with_weather(
        weather_doc("key", "Atlantis"),
        WeatherOutcome::Rejected {
            message: Some("city not found".into()),
        },
    );
    let expected = lines(&["Error: city not found"]);
    assert!(tick_until(&mut h.dashboard, |d| d.text_content(&id) == expected));

    let (mut h, id) = with_weather(
        weather_doc("key", "Atlantis"),
        WeatherOutcome::Rejected { message: None },
    );
    let expected = lines(&["Error: Unknown error"]);
    assert!(tick_until(&mut h.dashboard, |d| d.text_content(&id) == expected));
}

#[test]
fn network_failure_is_shown_inline() {
    let (mut h, id) = with_weather(
        weather_doc("key", "Paris"),
        WeatherOutcome::Failed {
            reason: "connection refused".into(),
        },
    );
    let expected = lines(&["Failed to fetch"]);
    assert!(tick_until(&mut h.dashboard, |d| d.text_content(&id) == expected));
}

#[test]
fn saving_settings_refreshes_weather() {
    let (mut h, id) = with_weather(weather_doc("", "Paris"), paris());
    assert_eq!(h.dashboard.text_content(&id), lines(&["API Key Missing"]));

    h.dashboard
        .save_settings_with(|doc| doc.weather.api_key = "fresh".into());

    let expected = lines(&["72°C", "Paris: clear sky"]);
    assert!(tick_until(&mut h.dashboard, |d| d.text_content(&id) == expected));
    assert_eq!(h.weather.queries.lock().unwrap().len(), 1);
}

#[test]
fn clearing_the_key_discards_the_fetch_in_flight() {
    let mut h = harness_with(
        Some(weather_doc("key", "Paris")),
        WidgetRegistry::with_defaults(),
        paris(),
        None,
    );
    h.weather.set_delay(Duration::from_millis(200));
    h.dashboard.start();
    let id = h
        .dashboard
        .add_widget("weather", None)
        .map(|w| w.id().clone())
        .unwrap();

    h.dashboard
        .save_settings_with(|doc| doc.weather.api_key.clear());
    assert_eq!(h.dashboard.text_content(&id), lines(&["API Key Missing"]));

    let late = lines(&["72°C", "Paris: clear sky"]);
    assert!(!tick_until(&mut h.dashboard, |d| d.text_content(&id) == late));
    assert_eq!(h.dashboard.text_content(&id), lines(&["API Key Missing"]));
    assert_eq!(h.weather.queries.lock().unwrap().len(), 1);
}

fn clipboard_harness(clipboard: Option<&str>) -> (Harness, WidgetId) {
    let mut h = harness_with(
        Some(weather_doc("", "")),
        WidgetRegistry::with_defaults(),
        harness::failed_weather(),
        clipboard.map(str::to_string),
    );
    h.dashboard.start();
    let id = h
        .dashboard
        .add_widget("clipboard", None)
        .map(|w| w.id().clone())
        .unwrap();
    (h, id)
}

#[test]
fn clipboard_shows_text_snapshot() {
    let (mut h, id) = clipboard_harness(Some("copied text"));
    assert_eq!(h.dashboard.text_content(&id), lines(&["Loading clipboard..."]));
    let expected = lines(&["copied text"]);
    assert!(tick_until(&mut h.dashboard, |d| d.text_content(&id) == expected));
}

#[test]
fn clipboard_empty_and_error_messages() {
    let (mut h, id) = clipboard_harness(Some(""));
    let expected = lines(&["Clipboard is empty or contains non-text data."]);
    assert!(tick_until(&mut h.dashboard, |d| d.text_content(&id) == expected));

    let (mut h, id) = clipboard_harness(None);
    let expected = lines(&["Error reading clipboard."]);
    assert!(tick_until(&mut h.dashboard, |d| d.text_content(&id) == expected));
}
