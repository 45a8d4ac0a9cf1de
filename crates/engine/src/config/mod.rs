//! Configuration management.
//! Loads the API connection settings, lookup tuning and the lookup field
//! declarations from `~/.config/stitch/config.json` (or YAML).

mod io;
mod model;
mod validation;

pub use io::{API_BASE_ENV_VAR, CONFIG_PATH_ENV_VAR, default_config_path, load_config, load_config_from_path};
pub use model::{ApiSettings, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS, StitchConfig};
pub use validation::{ValidationError, validate_config};
