use config::{Config, File};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = ".rain-node/config.toml";
pub const CI_ENV_VAR: &str = "CI";
const OVERRIDE_ENV_VAR: &str = "RAIN_NODE_CONFIG";

lazy_static! {
    // Entries come from CONFIG_FILE beneath $HOME, then beneath the
    // manifest directory and each of its parents, then from the file named
    // by OVERRIDE_ENV_VAR. Later sources win.
    static ref CONFIG: HashMap<String, String> = {
        let mut config = Config::builder();
        let global = env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE));
        if let Some(global) = global.as_ref().filter(|g| g.is_file()) {
            config = config.add_source(File::from(global.as_path()));
        }
        if let Some(manifest) = env::var_os("CARGO_MANIFEST_DIR") {
            let mut path = PathBuf::new();
            for c in PathBuf::from(manifest).components() {
                path.push(c);
                let local = path.join(CONFIG_FILE);
                if local.is_file() && Some(&local) != global.as_ref() {
                    config = config.add_source(File::from(local));
                }
            }
        }

        if let Some(cfg) = env::var_os(OVERRIDE_ENV_VAR) {
            config = config.add_source(File::from(PathBuf::from(cfg)));
        }
        let config = config.build().unwrap_or_default();
        config.try_deserialize().unwrap_or_default()
    };
}

pub fn lookup(key: &str) -> Option<&'static str> {
    CONFIG.get(key).map(String::as_str)
}

pub fn is_ci() -> bool {
    env::var_os(CI_ENV_VAR).is_some()
}
