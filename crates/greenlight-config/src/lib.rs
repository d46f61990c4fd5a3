pub mod context;
pub mod inputs;
pub mod manager;
pub mod types;

pub use context::{parse_repository, ActionContext};
pub use inputs::{parse_bool_input, ActionInputs, ResolvedConfig};
pub use manager::{ConfigError, ConfigManager, CONFIG_FILE_NAME};
pub use types::{BaselineSettings, DatasetSettings, GreenlightConfig};
