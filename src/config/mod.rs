mod loader;
mod settings;

pub use loader::{
    load_config, AuthEntry, LoadedConfig, ProfileConfig, VolleyConfig, CONFIG_FILE_NAME,
};
pub use settings::{Overrides, RunSettings, SettingsBuilder};
