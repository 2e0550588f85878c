//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

const TEXT_KEY_ENV: &str = "OPENROUTER_API_KEY";
const IMAGE_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `STORYLOOM_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// 凭据为空时回退到 `OPENROUTER_API_KEY` / `REPLICATE_API_TOKEN`。
///
/// # 环境变量示例
/// - `STORYLOOM_SERVER__PORT=8080`
/// - `STORYLOOM_TEXT__MODEL=nothingiisreal/mn-celeste-12b`
/// - `STORYLOOM_SPEECH__URL=http://tts-server:8000`
/// - `STORYLOOM_IMAGE__ENABLED=false`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5080)?
        .set_default("storage.data_dir", "data")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 例如: STORYLOOM_TEXT__API_KEY=sk-...
    builder = builder.add_source(
        Environment::with_prefix("STORYLOOM")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    apply_credential_fallbacks(&mut app_config, |name| std::env::var(name).ok());
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 用通用环境变量补齐未配置的凭据
fn apply_credential_fallbacks(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if config.text.api_key.trim().is_empty() {
        if let Some(key) = lookup(TEXT_KEY_ENV) {
            config.text.api_key = key;
        }
    }
    if config.image.api_token.trim().is_empty() {
        if let Some(token) = lookup(IMAGE_TOKEN_ENV) {
            config.image.api_token = token;
        }
    }
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.text.url.trim().is_empty() || config.text.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Text provider URL and model cannot be empty".to_string(),
        ));
    }

    if config.text.api_key.trim().is_empty() {
        return Err(ConfigError::MissingCredential(
            "STORYLOOM_TEXT__API_KEY or OPENROUTER_API_KEY",
        ));
    }

    if config.image.enabled && config.image.api_token.trim().is_empty() {
        return Err(ConfigError::MissingCredential(
            "STORYLOOM_IMAGE__API_TOKEN or REPLICATE_API_TOKEN (or disable image)",
        ));
    }

    if config.speech.enabled && config.speech.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech URL cannot be empty when speech is enabled".to_string(),
        ));
    }

    if config.generation.chapter_concurrency == 0 || config.generation.max_concurrent_jobs == 0 {
        return Err(ConfigError::ValidationError(
            "Chapter concurrency and max concurrent jobs must be at least 1".to_string(),
        ));
    }

    if config.generation.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Job queue capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志），不输出凭据
pub fn print_config(config: &AppConfig) {
    tracing::info!(addr = %config.server.addr(), "Server");
    tracing::info!(
        url = %config.text.url,
        model = %config.text.model,
        max_tokens = config.text.max_tokens,
        timeout_secs = config.text.timeout_secs,
        max_retries = config.text.max_retries,
        "Text provider"
    );
    if config.image.enabled {
        tracing::info!(
            base_url = %config.image.base_url,
            model = %config.image.model,
            width = config.image.width,
            height = config.image.height,
            illustrations = config.image.illustrations,
            "Image provider"
        );
    } else {
        tracing::info!("Image provider disabled");
    }
    if config.speech.enabled {
        tracing::info!(
            url = %config.speech.url,
            lang = %config.speech.lang,
            cache = config.speech.cache,
            "Speech provider"
        );
    } else {
        tracing::info!("Speech provider disabled");
    }
    tracing::info!(
        chapter_concurrency = config.generation.chapter_concurrency,
        max_concurrent_jobs = config.generation.max_concurrent_jobs,
        queue_capacity = config.generation.queue_capacity,
        characters = config.generation.characters,
        "Generation"
    );
    tracing::info!(pdf_font = ?config.export.pdf_font, "Export");
    tracing::info!(
        data_dir = ?config.storage.data_dir,
        log_level = %config.log.level,
        "Storage"
    );
}
