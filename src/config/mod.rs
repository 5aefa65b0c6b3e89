// Configuration management module
// TOML settings for the server, embedding backend, chunking and generative proxy

pub mod settings;


pub use settings::{
    Config, ConfigError, EmbeddingBackend, EmbeddingConfig, GenerativeConfig, OllamaConfig,
    ServerConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::default_dir()
}
