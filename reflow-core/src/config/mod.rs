//! Configuration types
//!
//! Board-agnostic tunables and their persisted JSON form.

#[cfg(feature = "serde")]
pub mod persist;
pub mod types;

#[cfg(feature = "serde")]
pub use persist::{
    load_profile_or_default, load_system_config_or_default, parse_profile, parse_system_config,
    render_system_config, ConfigError,
};
pub use types::{PidGains, SystemConfig};
