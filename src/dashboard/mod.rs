pub mod appearance;
pub mod container;
pub mod dashboard;
pub mod widgets;

pub use appearance::{AppliedBackground, Appearance, Resolution};
pub use container::{Container, ElementHandle, Panel, PanelMarkup};
pub use dashboard::{Dashboard, HostNotice, WidgetInstance};
pub use widgets::{
    Services, WidgetContext, WidgetDefinition, WidgetHandle, WidgetInput, WidgetKind,
    WidgetRegistry,
};
