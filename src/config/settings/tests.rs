use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.server.default_k, 3);
    assert_eq!(config.server.max_upload_bytes(), 50 * 1024 * 1024);
    assert_eq!(config.embedding.backend, EmbeddingBackend::Local);
    assert_eq!(config.embedding.model, "all-MiniLM-L6-v2");
    assert_eq!(config.chunking.sentence_split_threshold, 200);
    assert_eq!(config.generative.api_key_env, "GEMINI_API_KEY");
    assert_eq!(config.generative.model, "gemini-2.5-flash-preview-05-20");
    assert_eq!(config.generative.timeout_seconds, 30);
    assert!(config.validate().is_ok());
}

#[test]
fn config_validation() {
    let config = Config::default();

    let mut invalid_config = config.clone();
    invalid_config.server.port = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidPort(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.server.host = "not a host".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidHost(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.server.default_k = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidResultCount(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.server.max_upload_mb = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidUploadLimit(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.chunking.sentence_split_threshold = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidSplitThreshold(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.embedding.model = String::new();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidModel(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.generative.timeout_seconds = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTimeout(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.generative.endpoint = "ftp://example.com".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    let mut invalid_config = config;
    invalid_config.generative.api_key_env = "  ".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidApiKeyEnv(_))
    ));
}

#[test]
fn ollama_validated_only_when_selected() {
    let mut config = Config::default();
    config.embedding.ollama.batch_size = 0;
    assert!(config.validate().is_ok());

    config.embedding.backend = EmbeddingBackend::Ollama;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidBatchSize(0))
    ));

    config.embedding.ollama.batch_size = 1001;
    assert!(config.validate().is_err());

    config.embedding.ollama.batch_size = 32;
    config.embedding.ollama.protocol = "ftp".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));
}

#[test]
fn ollama_url_generation() {
    let url = OllamaConfig::default()
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn socket_addr() {
    let server = ServerConfig {
        host: "0.0.0.0".to_string(),
        port: 7860,
        ..ServerConfig::default()
    };
    let addr = server.socket_addr().expect("valid address");
    assert_eq!(addr.port(), 7860);
}

#[test]
fn explicit_cache_dir_wins() {
    let embedding = EmbeddingConfig {
        cache_dir: Some(PathBuf::from("/tmp/models")),
        ..EmbeddingConfig::default()
    };
    assert_eq!(
        embedding.resolved_cache_dir().expect("explicit dir"),
        PathBuf::from("/tmp/models")
    );
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_toml_uses_defaults() {
    let parsed: Config = toml::from_str(
        r#"
            [server]
            port = 9000

            [embedding]
            backend = "ollama"
        "#,
    )
    .expect("partial config parses");

    assert_eq!(parsed.server.port, 9000);
    assert_eq!(parsed.server.host, "127.0.0.1");
    assert_eq!(parsed.embedding.backend, EmbeddingBackend::Ollama);
    assert_eq!(parsed.chunking, ChunkingConfig::default());
}

#[test]
fn load_missing_file_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");

    let config = Config::load(temp_dir.path()).expect("missing file is fine");

    assert_eq!(config.server, ServerConfig::default());
    assert_eq!(config.get_base_dir(), temp_dir.path());
}

#[test]
fn save_and_load_round_trip() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let mut config = Config::load(temp_dir.path()).expect("defaults load");
    config.server.port = 9100;
    config.chunking.sentence_split_threshold = 400;

    config.save().expect("config saves");
    assert!(config.config_file_path().exists());

    let loaded = Config::load(temp_dir.path()).expect("saved config loads");
    assert_eq!(loaded, config);
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[server]\nport = 0\n",
    )
    .expect("should write config");

    assert!(Config::load(temp_dir.path()).is_err());
}
