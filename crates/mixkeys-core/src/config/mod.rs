mod app_entry;
#[allow(clippy::module_inception)]
mod config;
mod settings;
mod store;

pub use {
    app_entry::AppEntry, config::Config, settings::GlobalSettings, store::ConfigStore,
};

pub(crate) const DEFAULT_REMEMBER_VOLUMES: bool = true;
pub(crate) const DEFAULT_AUTO_START: bool = false;

pub(crate) fn default_remember_volumes() -> bool {
    DEFAULT_REMEMBER_VOLUMES
}

pub(crate) fn default_auto_start() -> bool {
    DEFAULT_AUTO_START
}
