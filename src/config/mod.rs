//! Configuration: TOML file, defaults and environment overrides.

mod loader;
mod types;

pub use loader::{ConfigError, ENV_API_BASE_URL, ENV_API_TIMEOUT};
pub use types::{ApiConfig, Config, DisplayConfig, PaginationConfig, SessionConfig};
