pub mod env;
pub mod error;
pub mod settings;

pub use env::EnvManager;
pub use error::SettingsError;
pub use settings::{LlmSettings, Settings};
