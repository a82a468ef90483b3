use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Opaque identifier of a widget instance. Generated once when the user adds
/// a widget and kept for the instance's whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random identifier in the textual UUIDv4 layout.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 16] = rng.gen();
        let mut out = String::with_capacity(36);
        for (i, b) in bytes.iter().enumerate() {
            let b = match i {
                6 => (b & 0x0f) | 0x40,
                8 => (b & 0x3f) | 0x80,
                _ => *b,
            };
            if matches!(i, 4 | 6 | 8 | 10) {
                out.push('-');
            }
            out.push_str(&format!("{b:02x}"));
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Metric,
    Imperial,
}

impl Default for TemperatureUnit {
    fn default() -> Self {
        TemperatureUnit::Metric
    }
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Metric => "metric",
            TemperatureUnit::Imperial => "imperial",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Metric => "°C",
            TemperatureUnit::Imperial => "°F",
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemperatureUnit::Metric => write!(f, "Metric (°C)"),
            TemperatureUnit::Imperial => write!(f, "Imperial (°F)"),
        }
    }
}

fn default_location() -> String {
    "London".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSettings {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub unit: TemperatureUnit,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            location: default_location(),
            api_key: String::new(),
            unit: TemperatureUnit::default(),
        }
    }
}

impl WeatherSettings {
    /// Overlay the fields present in `stored` on top of `self`.
    fn merge_from(&mut self, stored: &Value) {
        let Some(obj) = stored.as_object() else {
            if !stored.is_null() {
                tracing::warn!("stored weather settings are not an object; using defaults");
            }
            return;
        };
        for (key, value) in obj {
            match key.as_str() {
                "location" => take_field(key, value, &mut self.location),
                "apiKey" => take_field(key, value, &mut self.api_key),
                "unit" => take_field(key, value, &mut self.unit),
                _ => {}
            }
        }
    }
}

fn empty_object() -> Value {
    json!({})
}

/// Persisted placement of one widget: which instance, of which type, created
/// with which parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRef {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "empty_object")]
    pub config: Value,
}

impl WidgetRef {
    pub fn new(id: WidgetId, kind: impl Into<String>, config: Value) -> Self {
        Self {
            id,
            kind: kind.into(),
            config,
        }
    }
}

fn default_welcome_message() -> String {
    "Welcome to Chill Pulse!".into()
}

fn default_background_file() -> String {
    "background.mp4".into()
}

fn default_background_blur() -> f32 {
    10.0
}

fn default_background_opacity() -> f32 {
    0.5
}

/// The single shared state object: app-wide appearance, weather
/// configuration, the ordered list of widgets and the per-instance data bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
    /// Name of an entry in the background catalog. Empty means no background.
    #[serde(default = "default_background_file")]
    pub background_file: String,
    #[serde(default = "default_background_blur")]
    pub background_blur: f32,
    #[serde(default = "default_background_opacity")]
    pub background_opacity: f32,
    #[serde(default)]
    pub weather: WeatherSettings,
    /// Which widgets exist and in which order they render.
    #[serde(default)]
    pub active_widgets: Vec<WidgetRef>,
    /// Runtime data accumulated by widgets, keyed by instance id.
    #[serde(default)]
    pub widgets: BTreeMap<WidgetId, Value>,
    /// Fields this build does not know about, kept so they survive a save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            welcome_message: default_welcome_message(),
            background_file: default_background_file(),
            background_blur: default_background_blur(),
            background_opacity: default_background_opacity(),
            weather: WeatherSettings::default(),
            active_widgets: Vec::new(),
            widgets: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}

impl SettingsDocument {
    /// Build a complete document from whatever was persisted. Missing or
    /// mistyped fields fall back to the defaults, `weather` is merged field by
    /// field, and `activeWidgets`/`widgets` are kept only when they have the
    /// expected shape.
    pub fn from_stored(stored: &Value) -> Self {
        let mut doc = Self::default();
        let Some(obj) = stored.as_object() else {
            if !stored.is_null() {
                tracing::warn!("stored settings are not an object; using defaults");
            }
            return doc;
        };
        for (key, value) in obj {
            match key.as_str() {
                "welcomeMessage" => take_field(key, value, &mut doc.welcome_message),
                "backgroundFile" => take_field(key, value, &mut doc.background_file),
                "backgroundBlur" => take_field(key, value, &mut doc.background_blur),
                "backgroundOpacity" => take_field(key, value, &mut doc.background_opacity),
                "weather" => doc.weather.merge_from(value),
                "activeWidgets" => doc.active_widgets = parse_widget_refs(value),
                "widgets" => doc.widgets = parse_widget_bag(value),
                _ => {
                    doc.extra.insert(key.clone(), value.clone());
                }
            }
        }
        doc
    }

    pub fn to_value(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn widget_data(&self, id: &WidgetId) -> Option<&Value> {
        self.widgets.get(id)
    }

    /// Data bag entry for `id`, created as an empty object when absent.
    pub fn widget_data_mut(&mut self, id: &WidgetId) -> &mut Value {
        let entry = self.widgets.entry(id.clone()).or_insert_with(empty_object);
        if !entry.is_object() {
            *entry = empty_object();
        }
        entry
    }

    pub fn remove_widget_data(&mut self, id: &WidgetId) -> Option<Value> {
        self.widgets.remove(id)
    }

    pub fn has_active_widget(&self, id: &WidgetId) -> bool {
        self.active_widgets.iter().any(|w| &w.id == id)
    }

    /// Data bag keys without a matching entry in `active_widgets`.
    pub fn orphaned_widget_data(&self) -> Vec<WidgetId> {
        self.widgets
            .keys()
            .filter(|id| !self.has_active_widget(id))
            .cloned()
            .collect()
    }

    pub fn prune_orphaned_widget_data(&mut self) -> usize {
        let orphans = self.orphaned_widget_data();
        for id in &orphans {
            tracing::info!(widget = %id, "dropping data of widget that no longer exists");
            self.widgets.remove(id);
        }
        orphans.len()
    }
}

fn take_field<T: DeserializeOwned>(key: &str, value: &Value, slot: &mut T) {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(v) => *slot = v,
        Err(e) => tracing::warn!(field = key, "ignoring stored setting: {e}"),
    }
}

fn parse_widget_refs(value: &Value) -> Vec<WidgetRef> {
    let Some(items) = value.as_array() else {
        tracing::warn!("stored activeWidgets is not a list; starting with no widgets");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<WidgetRef>(item.clone()) {
            Ok(mut r) => {
                if r.config.is_null() {
                    r.config = empty_object();
                }
                Some(r)
            }
            Err(e) => {
                tracing::warn!("dropping malformed widget entry: {e}");
                None
            }
        })
        .collect()
}

fn parse_widget_bag(value: &Value) -> BTreeMap<WidgetId, Value> {
    match value.as_object() {
        Some(obj) => obj
            .iter()
            .map(|(k, v)| (WidgetId::new(k.clone()), v.clone()))
            .collect(),
        None => {
            tracing::warn!("stored widget data is not an object; starting empty");
            BTreeMap::new()
        }
    }
}
