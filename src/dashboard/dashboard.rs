use crate::background::BackgroundCatalog;
use crate::dashboard::appearance::{Appearance, Resolution};
use crate::dashboard::container::{Container, ElementHandle};
use crate::dashboard::widgets::{
    InertWidget, Services, WidgetContext, WidgetDefinition, WidgetHandle, WidgetInput,
    WidgetRegistry,
};
use crate::host::HostEvent;
use crate::settings::{SettingsDocument, WidgetId, WidgetRef};
use crate::sync::{LoadOutcome, SettingsSync, SyncState};
use eframe::egui;
use serde_json::Value;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// A notification forwarded from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostNotice {
    pub title: String,
    pub body: String,
}

/// One live widget: the persisted triple plus its running handle.
pub struct WidgetInstance {
    id: WidgetId,
    kind: String,
    config: Value,
    element: ElementHandle,
    handle: Box<dyn WidgetHandle>,
    refresh_on_apply: bool,
}

impl WidgetInstance {
    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn element(&self) -> &ElementHandle {
        &self.element
    }

    pub fn to_ref(&self) -> WidgetRef {
        WidgetRef::new(self.id.clone(), self.kind.clone(), self.config.clone())
    }
}

/// Owns the live widget collection and keeps it, the panel container and the
/// settings document consistent.
pub struct Dashboard {
    registry: WidgetRegistry,
    container: Container,
    live: Vec<WidgetInstance>,
    sync: SettingsSync,
    services: Services,
    catalog: BackgroundCatalog,
    appearance: Appearance,
    issued: HashSet<WidgetId>,
}

impl Dashboard {
    pub fn new(
        registry: WidgetRegistry,
        sync: SettingsSync,
        services: Services,
        catalog: BackgroundCatalog,
    ) -> Self {
        Self {
            registry,
            container: Container::new(),
            live: Vec::new(),
            sync,
            services,
            catalog,
            appearance: Appearance::default(),
            issued: HashSet::new(),
        }
    }

    /// Load settings, apply them and build every stored widget.
    pub fn start(&mut self) -> LoadOutcome {
        let outcome = self.sync.initialize();
        self.apply_settings();
        self.render_all();
        outcome
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn instances(&self) -> &[WidgetInstance] {
        &self.live
    }

    pub fn instance(&self, id: &WidgetId) -> Option<&WidgetInstance> {
        self.live.iter().find(|w| &w.id == id)
    }

    pub fn document(&self) -> &SettingsDocument {
        self.sync.document()
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    /// Changes whenever the document is mutated or replaced.
    pub fn revision(&self) -> u64 {
        self.sync.revision()
    }

    pub fn catalog(&self) -> &BackgroundCatalog {
        &self.catalog
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn text_content(&self, id: &WidgetId) -> Option<Vec<String>> {
        self.instance(id)
            .map(|w| w.handle.text_content(self.sync.document()))
    }

    fn fresh_id(&self) -> WidgetId {
        loop {
            let id = WidgetId::generate();
            if !self.issued.contains(&id) {
                return id;
            }
        }
    }

    /// Create a widget. With `existing` the stored triple is restored as is;
    /// without it a new id and default config are issued, the ref is
    /// appended to `activeWidgets` and the document is saved.
    pub fn add_widget(&mut self, tag: &str, existing: Option<&WidgetRef>) -> Option<&WidgetInstance> {
        let Some(definition) = self.registry.lookup(tag).cloned() else {
            tracing::error!(widget = tag, "unknown widget type");
            return None;
        };
        let (id, config) = match existing {
            Some(r) => (r.id.clone(), r.config.clone()),
            None => (self.fresh_id(), definition.default_config()),
        };
        if let Some(index) = self.live.iter().position(|w| w.id == id) {
            tracing::warn!(widget = %id, "replacing live instance with the same id");
            self.live[index].handle.cleanup();
            let old = self.live.remove(index);
            self.container.remove(old.element.element_id());
        }
        self.issued.insert(id.clone());

        let element = self.container.insert_end(&id, definition.markup(&id));
        self.container.bind_remove_control(element.element_id(), &id);
        let handle = {
            let mut ctx = WidgetContext::new(&id, &mut self.sync, &self.services, &element, Instant::now());
            init_isolated(&definition, &id, &config, &mut ctx)
        };
        self.live.push(WidgetInstance {
            id: id.clone(),
            kind: tag.to_string(),
            config: config.clone(),
            element,
            handle,
            refresh_on_apply: definition.refresh_on_apply(),
        });

        if existing.is_none() {
            let r = WidgetRef::new(id.clone(), tag, config);
            self.sync.update_and_save(|doc| doc.active_widgets.push(r));
            tracing::info!(widget = %id, kind = tag, "widget added");
        }
        self.live.last()
    }

    /// Tear one widget down: cleanup, drop the live instance, detach its
    /// panel, delete its data and save.
    pub fn remove_widget(&mut self, id: &WidgetId) -> bool {
        let Some(index) = self.live.iter().position(|w| &w.id == id) else {
            tracing::warn!(widget = %id, "remove requested for unknown widget");
            return false;
        };
        self.live[index].handle.cleanup();
        let instance = self.live.remove(index);
        self.container.remove(instance.element.element_id());
        self.sync.update_and_save(|doc| {
            doc.remove_widget_data(id);
            doc.active_widgets.retain(|w| &w.id != id);
        });
        tracing::info!(widget = %id, kind = %instance.kind, "widget removed");
        true
    }

    /// Discard every live widget and rebuild from `activeWidgets`.
    pub fn render_all(&mut self) {
        for instance in &mut self.live {
            instance.handle.cleanup();
        }
        self.live.clear();
        self.container.clear();

        let stored = self.sync.document().active_widgets.clone();
        let mut kept: Vec<WidgetRef> = Vec::with_capacity(stored.len());
        for r in &stored {
            if !self.registry.contains(&r.kind) {
                tracing::warn!(widget = %r.id, kind = %r.kind, "dropping widget of unknown type");
                continue;
            }
            if kept.iter().any(|k| k.id == r.id) {
                tracing::warn!(widget = %r.id, "dropping duplicate widget id");
                continue;
            }
            self.add_widget(&r.kind, Some(r));
            kept.push(r.clone());
        }

        let dropped = kept.len() != stored.len();
        if dropped || !self.sync.document().orphaned_widget_data().is_empty() {
            let pruned = self.sync.update(|doc| {
                doc.active_widgets = kept;
                doc.prune_orphaned_widget_data()
            });
            tracing::debug!(pruned, "stale widget data pruned");
        }
        tracing::info!(widgets = self.live.len(), "widgets rendered");
    }

    /// Apply app-wide settings and refresh the widgets that follow them.
    pub fn apply_settings(&mut self) {
        loop {
            match Appearance::resolve(self.sync.document(), &self.catalog) {
                Resolution::Applied(appearance) => {
                    self.appearance = appearance;
                    break;
                }
                Resolution::FallBack(name) => {
                    tracing::info!(background = %name, "falling back to first background");
                    self.sync.update(|doc| doc.background_file = name);
                }
            }
        }
        let now = Instant::now();
        let Self {
            live,
            sync,
            services,
            ..
        } = self;
        for instance in live.iter_mut().filter(|w| w.refresh_on_apply) {
            let mut ctx = WidgetContext::new(&instance.id, sync, services, &instance.element, now);
            instance.handle.update(&mut ctx);
        }
    }

    /// Mutate the document and save it, then re-apply.
    pub fn save_settings_with(&mut self, f: impl FnOnce(&mut SettingsDocument)) {
        self.sync.update_and_save(f);
        self.apply_settings();
    }

    /// Route a user interaction to one widget.
    pub fn dispatch(&mut self, id: &WidgetId, input: WidgetInput) -> bool {
        let Self {
            live,
            sync,
            services,
            ..
        } = self;
        let Some(instance) = live.iter_mut().find(|w| &w.id == id) else {
            tracing::warn!(widget = %id, "input for unknown widget");
            return false;
        };
        let mut ctx = WidgetContext::new(&instance.id, sync, services, &instance.element, Instant::now());
        instance.handle.handle_input(input, &mut ctx);
        true
    }

    /// Advance timers and async replies of every widget.
    pub fn tick(&mut self, now: Instant) {
        let Self {
            live,
            sync,
            services,
            ..
        } = self;
        for instance in live.iter_mut() {
            let mut ctx = WidgetContext::new(&instance.id, sync, services, &instance.element, now);
            instance.handle.tick(&mut ctx);
        }
    }

    /// Drain host broadcasts. Settings replace the local document and are
    /// re-applied; notifications are returned for display.
    pub fn process_host_events(&mut self) -> Vec<HostNotice> {
        let mut notices = Vec::new();
        while let Some(event) = self.sync.next_event() {
            match event {
                HostEvent::SettingsUpdated(doc) => {
                    tracing::debug!("settings broadcast received");
                    self.sync.receive_broadcast(doc);
                    self.apply_settings();
                }
                HostEvent::Notification { title, body } => notices.push(HostNotice { title, body }),
            }
        }
        notices
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();
        let mut remove = None;
        let Self {
            live,
            sync,
            services,
            container,
            ..
        } = self;
        let columns = ((ui.available_width() / 320.0).floor() as usize).max(1);
        egui::Grid::new("dashboard_widgets")
            .num_columns(columns)
            .spacing([12.0, 12.0])
            .show(ui, |ui| {
                for (idx, panel) in container.panels().iter().enumerate() {
                    let Some(instance) = live.iter_mut().find(|w| &w.id == panel.widget()) else {
                        continue;
                    };
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(300.0);
                        ui.vertical(|ui| {
                            ui.horizontal(|ui| {
                                ui.heading(panel.heading());
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                    if ui.small_button("✕").on_hover_text("Remove widget").clicked() {
                                        remove = panel.remove_binding().cloned();
                                    }
                                });
                            });
                            ui.separator();
                            let mut ctx = WidgetContext::new(&instance.id, sync, services, &instance.element, now);
                            instance.handle.ui(ui, &mut ctx);
                        });
                    });
                    if (idx + 1) % columns == 0 {
                        ui.end_row();
                    }
                }
            });
        if let Some(id) = remove {
            self.remove_widget(&id);
        }
    }
}

/// Run an initializer so that neither an error nor a panic escapes it.
fn init_isolated(
    definition: &WidgetDefinition,
    id: &WidgetId,
    config: &Value,
    ctx: &mut WidgetContext<'_>,
) -> Box<dyn WidgetHandle> {
    match panic::catch_unwind(AssertUnwindSafe(|| definition.init(id, config, ctx))) {
        Ok(Ok(handle)) => handle,
        Ok(Err(e)) => {
            tracing::error!(widget = %id, kind = definition.tag(), "widget failed to start: {e:#}");
            Box::new(InertWidget)
        }
        Err(_) => {
            tracing::error!(widget = %id, kind = definition.tag(), "widget initializer panicked");
            Box::new(InertWidget)
        }
    }
}
