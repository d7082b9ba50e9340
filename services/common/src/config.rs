//! Layered configuration loading shared by every binary in the workspace:
//! a TOML file overridden by environment variables under a per-service
//! prefix.

use anyhow::Result;
use serde::de::DeserializeOwned;

/// Load a config struct from an optional TOML file, overridden by
/// environment variables prefixed with `env_prefix` (e.g. `COORDINATOR_`).
///
/// Missing file is not an error — callers fall back to `T::default()`
/// merged with env vars rather than refusing to start.
pub fn load_layered<T: DeserializeOwned>(path: Option<&str>, env_prefix: &str) -> Result<T> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix(env_prefix).separator("__"));
    let settings = builder.build()?;
    Ok(settings.try_deserialize()?)
}
