//! Collaborator app registry and mount lifecycle.

use std::collections::{BTreeMap, HashMap};

use desktop_app_contract::{
    AppFactory, AppId, AppMountContext, ManagedApp, OsSettings, ShellRequestQueue,
};

#[derive(Default)]
/// Factories for mountable apps and the instances currently mounted.
pub struct AppBus {
    factories: HashMap<AppId, AppFactory>,
    mounted: BTreeMap<AppId, Box<dyn ManagedApp>>,
    requests: ShellRequestQueue,
}

impl AppBus {
    pub fn register(&mut self, app_id: AppId, factory: AppFactory) {
        self.factories.insert(app_id, factory);
    }

    pub fn requests(&self) -> ShellRequestQueue {
        self.requests.clone()
    }

    pub fn is_mounted(&self, app_id: &AppId) -> bool {
        self.mounted.contains_key(app_id)
    }

    pub fn mounted_ids(&self) -> Vec<AppId> {
        self.mounted.keys().cloned().collect()
    }

    pub fn mount(&mut self, app_id: AppId, settings: &OsSettings) {
        if self.mounted.contains_key(&app_id) {
            return;
        }
        let Some(factory) = self.factories.get(&app_id) else {
            log::debug!("no app registered for `{app_id}`; window frame stays empty");
            return;
        };
        let mut app = factory();
        app.mount(AppMountContext::new(
            app_id.clone(),
            settings.clone(),
            self.requests.clone(),
        ));
        self.mounted.insert(app_id, app);
    }

    pub fn unmount(&mut self, app_id: &AppId) {
        if let Some(mut app) = self.mounted.remove(app_id) {
            app.unmount();
        }
    }

    pub fn broadcast_settings(&mut self, settings: &OsSettings) {
        for app in self.mounted.values_mut() {
            app.settings_changed(settings);
        }
    }
}
