use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    Video,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundEntry {
    pub name: String,
    pub kind: BackgroundKind,
}

impl BackgroundEntry {
    pub fn new(name: &str, kind: BackgroundKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }

    /// Location of the asset relative to the working directory.
    pub fn asset_path(&self) -> String {
        format!("./assets/{}", self.name)
    }
}

/// Ordered list of the backgrounds shipped with the app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundCatalog {
    entries: Vec<BackgroundEntry>,
}

static BUILTIN: Lazy<BackgroundCatalog> = Lazy::new(|| {
    BackgroundCatalog::new(vec![
        BackgroundEntry::new("background.mp4", BackgroundKind::Video),
        BackgroundEntry::new("sample-image.jpg", BackgroundKind::Image),
    ])
});

impl BackgroundCatalog {
    pub fn new(entries: Vec<BackgroundEntry>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> &'static BackgroundCatalog {
        &BUILTIN
    }

    pub fn entries(&self) -> &[BackgroundEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&BackgroundEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn first(&self) -> Option<&BackgroundEntry> {
        self.entries.first()
    }
}
