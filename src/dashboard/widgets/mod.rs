use crate::dashboard::container::{ElementHandle, PanelMarkup};
use crate::host::PlatformApi;
use crate::settings::{SettingsDocument, WidgetId};
use crate::sync::SettingsSync;
use eframe::egui;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

mod clipboard;
mod clock;
mod date;
mod pomodoro;
mod todo;
mod weather;

pub use clipboard::ClipboardWidget;
pub use clock::ClockWidget;
pub use date::DateWidget;
pub use pomodoro::{PomodoroEvent, PomodoroPhase, PomodoroTimer, PomodoroWidget};
pub use todo::{TodoEntry, TodoWidget};
pub use weather::{
    parse_weather_response, OpenWeatherMap, WeatherOutcome, WeatherProvider, WeatherQuery,
    WeatherReport, WeatherWidget,
};

/// The built-in widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Clock,
    Date,
    Todo,
    Weather,
    Pomodoro,
    Clipboard,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 6] = [
        WidgetKind::Clock,
        WidgetKind::Date,
        WidgetKind::Todo,
        WidgetKind::Weather,
        WidgetKind::Pomodoro,
        WidgetKind::Clipboard,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            WidgetKind::Clock => "clock",
            WidgetKind::Date => "date",
            WidgetKind::Todo => "todo",
            WidgetKind::Weather => "weather",
            WidgetKind::Pomodoro => "pomodoro",
            WidgetKind::Clipboard => "clipboard",
        }
    }

    /// Name shown in the widget picker.
    pub fn title(&self) -> &'static str {
        match self {
            WidgetKind::Clock => "Clock",
            WidgetKind::Date => "Date",
            WidgetKind::Todo => "To-Dos",
            WidgetKind::Weather => "Weather",
            WidgetKind::Pomodoro => "Pomodoro Timer",
            WidgetKind::Clipboard => "Clipboard",
        }
    }

    /// Heading of the panel itself.
    pub fn heading(&self) -> &'static str {
        match self {
            WidgetKind::Clock => "Time",
            WidgetKind::Date => "Date",
            WidgetKind::Todo => "To-Do List",
            WidgetKind::Weather => "Weather",
            WidgetKind::Pomodoro => "Pomodoro",
            WidgetKind::Clipboard => "Clipboard",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn definition(self) -> WidgetDefinition {
        let def = WidgetDefinition::new(self.tag(), self.title(), self.heading(), move |id, _config, ctx| {
            let handle: Box<dyn WidgetHandle> = match self {
                WidgetKind::Clock => Box::new(ClockWidget::init(ctx)),
                WidgetKind::Date => Box::new(DateWidget::init(ctx)),
                WidgetKind::Todo => Box::new(TodoWidget::init(id, ctx)),
                WidgetKind::Weather => Box::new(WeatherWidget::init(ctx)),
                WidgetKind::Pomodoro => Box::new(PomodoroWidget::init(ctx)),
                WidgetKind::Clipboard => Box::new(ClipboardWidget::init(ctx)),
            };
            Ok(handle)
        });
        match self {
            WidgetKind::Weather => def.refreshed_on_apply(),
            _ => def,
        }
    }
}

/// User interactions routed to one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetInput {
    Todo(TodoInput),
    Pomodoro(PomodoroInput),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoInput {
    Add(String),
    Toggle(usize),
    Delete(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PomodoroInput {
    Start,
    Pause,
    Reset,
}

/// Services a widget may call while running.
#[derive(Clone)]
pub struct Services {
    pub platform: Arc<dyn PlatformApi>,
    pub weather: Arc<dyn WeatherProvider>,
}

/// Everything a widget sees during one call: its own id and panel, the live
/// settings document and the platform services.
pub struct WidgetContext<'a> {
    id: &'a WidgetId,
    sync: &'a mut SettingsSync,
    services: &'a Services,
    element: &'a ElementHandle,
    now: Instant,
}

impl<'a> WidgetContext<'a> {
    pub fn new(
        id: &'a WidgetId,
        sync: &'a mut SettingsSync,
        services: &'a Services,
        element: &'a ElementHandle,
        now: Instant,
    ) -> Self {
        Self {
            id,
            sync,
            services,
            element,
            now,
        }
    }

    pub fn id(&self) -> &WidgetId {
        self.id
    }

    pub fn document(&self) -> &SettingsDocument {
        self.sync.document()
    }

    /// This widget's data bag, if it has one.
    pub fn data(&self) -> Option<&Value> {
        self.sync.document().widget_data(self.id)
    }

    /// Change this widget's data bag in memory only.
    pub fn update_data<R>(&mut self, f: impl FnOnce(&mut Value) -> R) -> R {
        let id = self.id;
        self.sync.update(|doc| f(doc.widget_data_mut(id)))
    }

    /// Change this widget's data bag and save the whole document.
    pub fn save_data<R>(&mut self, f: impl FnOnce(&mut Value) -> R) -> R {
        let id = self.id;
        self.sync.update_and_save(|doc| f(doc.widget_data_mut(id)))
    }

    pub fn platform(&self) -> &dyn PlatformApi {
        self.services.platform.as_ref()
    }

    pub fn weather(&self) -> Arc<dyn WeatherProvider> {
        Arc::clone(&self.services.weather)
    }

    pub fn element(&self) -> &ElementHandle {
        self.element
    }

    pub fn now(&self) -> Instant {
        self.now
    }
}

/// A running widget instance. `update` and `cleanup` default to no-ops.
pub trait WidgetHandle {
    /// Re-read settings and refresh.
    fn update(&mut self, _ctx: &mut WidgetContext<'_>) {}

    /// Cancel timers and drop bindings. Called once, before the panel is
    /// detached.
    fn cleanup(&mut self) {}

    /// Advance timers and collect async replies.
    fn tick(&mut self, _ctx: &mut WidgetContext<'_>) {}

    fn handle_input(&mut self, _input: WidgetInput, _ctx: &mut WidgetContext<'_>) {}

    /// Text currently shown in the panel, one entry per line.
    fn text_content(&self, doc: &SettingsDocument) -> Vec<String>;

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut WidgetContext<'_>) {
        for line in self.text_content(ctx.document()) {
            ui.label(line);
        }
    }
}

/// Handle for an instance whose initializer failed.
pub struct InertWidget;

impl WidgetHandle for InertWidget {
    fn text_content(&self, _doc: &SettingsDocument) -> Vec<String> {
        Vec::new()
    }
}

pub type InitFn = dyn Fn(&WidgetId, &Value, &mut WidgetContext<'_>) -> anyhow::Result<Box<dyn WidgetHandle>>
    + Send
    + Sync;

/// Descriptor for building widget instances of one type.
#[derive(Clone)]
pub struct WidgetDefinition {
    tag: String,
    title: String,
    heading: String,
    init: Arc<InitFn>,
    refresh_on_apply: bool,
}

impl WidgetDefinition {
    pub fn new<F>(tag: &str, title: &str, heading: &str, init: F) -> Self
    where
        F: Fn(&WidgetId, &Value, &mut WidgetContext<'_>) -> anyhow::Result<Box<dyn WidgetHandle>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            tag: tag.to_string(),
            title: title.to_string(),
            heading: heading.to_string(),
            init: Arc::new(init),
            refresh_on_apply: false,
        }
    }

    /// Have the settings-apply step call `update` on every instance.
    pub fn refreshed_on_apply(mut self) -> Self {
        self.refresh_on_apply = true;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn refresh_on_apply(&self) -> bool {
        self.refresh_on_apply
    }

    /// Config stored with a newly added instance. No built-in kind takes
    /// parameters yet.
    pub fn default_config(&self) -> Value {
        json!({})
    }

    pub fn markup(&self, id: &WidgetId) -> PanelMarkup {
        PanelMarkup {
            element_id: format!("widget-{id}"),
            heading: self.heading.clone(),
        }
    }

    pub fn init(
        &self,
        id: &WidgetId,
        config: &Value,
        ctx: &mut WidgetContext<'_>,
    ) -> anyhow::Result<Box<dyn WidgetHandle>> {
        (self.init)(id, config, ctx)
    }
}

#[derive(Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<String, WidgetDefinition>,
    order: Vec<String>,
}

impl WidgetRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        for kind in WidgetKind::ALL {
            reg.register(kind.definition());
        }
        reg
    }

    pub fn register(&mut self, definition: WidgetDefinition) {
        let tag = definition.tag().to_string();
        if self.map.insert(tag.clone(), definition).is_none() {
            self.order.push(tag);
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.map.contains_key(tag)
    }

    pub fn lookup(&self, tag: &str) -> Option<&WidgetDefinition> {
        self.map.get(tag)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &WidgetDefinition> {
        self.order.iter().filter_map(|tag| self.map.get(tag))
    }
}
