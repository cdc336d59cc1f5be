use std::env;

use serde::Deserialize;
use thiserror::Error;

use crate::structs::alias::SqlFile;
use crate::utils::read_file_if_exists;

/// 配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "QUIZFORGE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("解析配置文件失败: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub quiz: QuizConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub file: SqlFile,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file: "quizforge.db".to_string(),
            max_connections: 5,
        }
    }
}

/// 密钥本身不写进配置文件，只记录从哪个环境变量读取
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_new_tokens: u32,
    pub temperature: f64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api-inference.huggingface.co/models/microsoft/DialoGPT-medium".to_string(),
            api_key_env: "HUGGINGFACE_API_KEY".to_string(),
            timeout_secs: 30,
            max_new_tokens: 500,
            temperature: 0.7,
        }
    }
}

impl ProviderConfig {
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub default_page_limit: u32,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self { default_page_limit: 10 }
    }
}

impl Config {
    pub fn parse(contents: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// 文件不存在时使用默认配置
    pub fn load(path: &str) -> Result<Config, ConfigError> {
        match read_file_if_exists(path)? {
            Some(contents) => Config::parse(&contents),
            None => {
                log::info!("配置文件{path}不存在，使用默认配置");
                Ok(Config::default())
            }
        }
    }

    pub fn from_env() -> Result<Config, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Config::load(&path)
    }
}
