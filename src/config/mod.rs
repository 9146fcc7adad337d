// Configuration management module
// TOML settings file overlaid with environment variables

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    ChatConfig, Config, ConfigError, EmbeddingConfig, LlmConfig, PineconeConfig, mask_secret,
};
