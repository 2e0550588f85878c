//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::adapters::RetryPolicy;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 文本生成服务
    #[serde(default)]
    pub text: TextConfig,

    /// 封面图像生成服务
    #[serde(default)]
    pub image: ImageConfig,

    /// 朗读（TTS）服务
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 流水线与任务
    #[serde(default)]
    pub generation: GenerationConfig,

    /// 导出配置
    #[serde(default)]
    pub export: ExportConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 文本生成服务配置（OpenRouter 兼容）
#[derive(Debug, Clone, Deserialize)]
pub struct TextConfig {
    /// Chat Completion 完整 URL
    #[serde(default = "default_text_url")]
    pub url: String,

    /// 为空时读取 OPENROUTER_API_KEY
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_text_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// 请求超时时间（秒）
    #[serde(default = "default_text_timeout")]
    pub timeout_secs: u64,

    /// 瞬时错误的最大重试次数
    #[serde(default = "default_text_retries")]
    pub max_retries: usize,

    #[serde(default)]
    pub referer: Option<String>,

    #[serde(default)]
    pub app_title: Option<String>,
}

fn default_text_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_text_model() -> String {
    "nothingiisreal/mn-celeste-12b".to_string()
}

fn default_temperature() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    1800
}

fn default_text_timeout() -> u64 {
    120
}

fn default_text_retries() -> usize {
    2
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            url: default_text_url(),
            api_key: String::new(),
            model: default_text_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_text_timeout(),
            max_retries: default_text_retries(),
            referer: None,
            app_title: None,
        }
    }
}

impl TextConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }
}

/// 图像生成服务配置（Replicate 兼容）
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    /// 关闭后不生成封面、插图和肖像
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_image_url")]
    pub base_url: String,

    /// 为空时读取 REPLICATE_API_TOKEN
    #[serde(default)]
    pub api_token: String,

    /// owner/name
    #[serde(default = "default_image_model")]
    pub model: String,

    #[serde(default = "default_negative_prompt")]
    pub negative_prompt: String,

    #[serde(default = "default_steps")]
    pub num_inference_steps: u32,

    #[serde(default = "default_guidance")]
    pub guidance_scale: f32,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// 为小说的每章生成插图
    #[serde(default = "default_true")]
    pub illustrations: bool,

    /// 角色肖像尺寸
    #[serde(default = "default_portrait_size")]
    pub portrait_width: u32,

    #[serde(default = "default_portrait_size")]
    pub portrait_height: u32,

    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,

    /// 轮询总时长上限（秒）
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_image_retries")]
    pub max_retries: usize,
}

fn default_true() -> bool {
    true
}

fn default_image_url() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_image_model() -> String {
    "lucataco/realistic-vision-v5.1".to_string()
}

fn default_negative_prompt() -> String {
    "blurry, watermark, text".to_string()
}

fn default_steps() -> u32 {
    30
}

fn default_guidance() -> f32 {
    7.5
}

fn default_width() -> u32 {
    768
}

fn default_height() -> u32 {
    1024
}

fn default_portrait_size() -> u32 {
    512
}

fn default_image_timeout() -> u64 {
    60
}

fn default_max_wait() -> u64 {
    180
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_image_retries() -> usize {
    2
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_image_url(),
            api_token: String::new(),
            model: default_image_model(),
            negative_prompt: default_negative_prompt(),
            num_inference_steps: default_steps(),
            guidance_scale: default_guidance(),
            width: default_width(),
            height: default_height(),
            illustrations: true,
            portrait_width: default_portrait_size(),
            portrait_height: default_portrait_size(),
            timeout_secs: default_image_timeout(),
            max_wait_secs: default_max_wait(),
            poll_interval_ms: default_poll_interval(),
            max_retries: default_image_retries(),
        }
    }
}

impl ImageConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }
}

/// 朗读服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// 关闭后章节不带音频
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// TTS 服务基础 URL
    #[serde(default = "default_speech_url")]
    pub url: String,

    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,

    /// 合成较慢，默认不重试
    #[serde(default)]
    pub max_retries: usize,

    /// 相同文本只合成一次
    #[serde(default = "default_true")]
    pub cache: bool,
}

fn default_speech_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_speech_timeout() -> u64 {
    120
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_speech_url(),
            lang: default_lang(),
            timeout_secs: default_speech_timeout(),
            max_retries: 0,
            cache: true,
        }
    }
}

impl SpeechConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries).with_max_delay(Duration::from_secs(30))
    }
}

/// 流水线与任务配置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// 同时生成的章节数，1 表示严格顺序
    #[serde(default = "default_one")]
    pub chapter_concurrency: usize,

    /// 同时运行的生成任务数
    #[serde(default = "default_one")]
    pub max_concurrent_jobs: usize,

    /// 排队任务上限
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 是否为小说生成角色卡
    #[serde(default = "default_true")]
    pub characters: bool,
}

fn default_one() -> usize {
    1
}

fn default_queue_capacity() -> usize {
    100
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chapter_concurrency: 1,
            max_concurrent_jobs: 1,
            queue_capacity: default_queue_capacity(),
            characters: true,
        }
    }
}

/// 导出配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// PDF 中 WinAnsi 之外字符使用的 TrueType 字体，未设置时查找系统字体
    #[serde(default)]
    pub pdf_font: Option<PathBuf>,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 数据根目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    pub fn books_path(&self) -> PathBuf {
        self.data_dir.join("books.sled")
    }

    pub fn narration_cache_path(&self) -> PathBuf {
        self.data_dir.join("narration.sled")
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
