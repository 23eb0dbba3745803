mod error;
mod settings;
mod validation;

pub use error::{ConfigError, ConfigResult};
pub use settings::{DialectSetting, ReplicaSettings, Settings, TimingSettings};
pub use validation::{validate_settings, MAX_CHANNEL_LEN};
