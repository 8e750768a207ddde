//! Launchable app catalog.

use std::collections::HashSet;

use desktop_app_contract::AppId;
use serde::{Deserialize, Serialize};

include!(concat!(env!("OUT_DIR"), "/app_catalog_generated.rs"));

/// Static catalog entry describing one launchable app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    pub app_id: AppId,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub show_on_desktop: bool,
    #[serde(default = "default_pinned")]
    pub pinned: bool,
}

fn default_pinned() -> bool {
    true
}

impl AppDescriptor {
    pub fn new(
        app_id: AppId,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            app_id,
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            show_on_desktop: false,
            pinned: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppCatalog {
    apps: Vec<AppDescriptor>,
}

impl AppCatalog {
    /// Builds a catalog, keeping the first descriptor for any repeated id.
    pub fn from_descriptors(descriptors: Vec<AppDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let apps = descriptors
            .into_iter()
            .filter(|app| seen.insert(app.app_id.clone()))
            .collect();
        Self { apps }
    }

    /// The catalog compiled from `catalog/apps.toml`.
    pub fn builtin() -> Self {
        match serde_json::from_str::<Vec<AppDescriptor>>(APP_CATALOG_JSON) {
            Ok(apps) => Self::from_descriptors(apps),
            Err(err) => {
                log::warn!("built-in app catalog decode failed: {err}");
                Self::default()
            }
        }
    }

    pub fn get(&self, app_id: &AppId) -> Option<&AppDescriptor> {
        self.apps.iter().find(|app| &app.app_id == app_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppDescriptor> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn desktop_icons(&self) -> impl Iterator<Item = &AppDescriptor> {
        self.apps.iter().filter(|app| app.show_on_desktop)
    }

    pub fn pinned(&self) -> impl Iterator<Item = &AppDescriptor> {
        self.apps.iter().filter(|app| app.pinned)
    }

    /// Start-menu search: case-insensitive substring match on the display name.
    pub fn search(&self, query: &str) -> Vec<&AppDescriptor> {
        let needle = query.trim().to_lowercase();
        self.apps
            .iter()
            .filter(|app| needle.is_empty() || app.name.to_lowercase().contains(&needle))
            .collect()
    }
}
