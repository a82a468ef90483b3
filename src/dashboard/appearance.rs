use crate::background::{BackgroundCatalog, BackgroundEntry};
use crate::settings::SettingsDocument;

/// Brightness multiplier applied on top of every background.
pub const BACKGROUND_BRIGHTNESS: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedBackground {
    pub entry: BackgroundEntry,
    pub blur_px: f32,
    pub opacity: f32,
}

/// App-wide look derived from the settings document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Appearance {
    pub welcome_message: String,
    pub background: Option<AppliedBackground>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Applied(Appearance),
    /// The stored background is not in the catalog; switch the document to
    /// this entry and resolve again.
    FallBack(String),
}

impl Appearance {
    pub fn resolve(doc: &SettingsDocument, catalog: &BackgroundCatalog) -> Resolution {
        let name = doc.background_file.as_str();
        let background = if name.is_empty() {
            None
        } else {
            match catalog.find(name) {
                Some(entry) => Some(AppliedBackground {
                    entry: entry.clone(),
                    blur_px: doc.background_blur.max(0.0),
                    opacity: doc.background_opacity.clamp(0.0, 1.0),
                }),
                None => {
                    tracing::warn!(background = name, "background not in catalog");
                    match catalog.first() {
                        Some(first) => return Resolution::FallBack(first.name.clone()),
                        None => None,
                    }
                }
            }
        };
        Resolution::Applied(Appearance {
            welcome_message: doc.welcome_message.clone(),
            background,
        })
    }
}
