use std::collections::HashMap;

pub type EnvMap = HashMap<String, String>;

mod loader;
mod vars;

pub use loader::load_env_file;
pub use vars::expand_vars;
