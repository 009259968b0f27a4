//! 统一配置系统
//!
//! 提供TOML/JSON配置文件和环境变量覆盖

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub mod emitter;
pub mod particles;

pub use emitter::EmitterConfig;
pub use particles::{
    BackendKind, DrawMode, ExhaustionPolicy, ParticleConfig, SpawnDefaults, DEFAULT_CAPACITY,
};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 默认配置文件名
pub const CONFIG_TOML: &str = "line_particles.toml";
pub const CONFIG_JSON: &str = "line_particles.json";

/// 主配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 粒子系统配置
    #[serde(default)]
    pub particles: ParticleConfig,

    /// 周期发射器配置
    #[serde(default)]
    pub emitter: EmitterConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 配置来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Toml(String),
    Json(String),
    Default,
}

impl EngineConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Ok(val) = env::var("LINE_PARTICLES_CAPACITY") {
            self.particles.capacity = val
                .parse()
                .map_err(|_| ConfigError::ParseError(format!("Invalid capacity: {val}")))?;
        }
        if let Ok(val) = env::var("LINE_PARTICLES_BACKEND") {
            self.particles.backend = val.parse()?;
        }
        if let Ok(val) = env::var("LINE_PARTICLES_SPAWN_RATE") {
            self.emitter.spawn_rate = val
                .parse()
                .map_err(|_| ConfigError::ParseError(format!("Invalid spawn rate: {val}")))?;
        }
        Ok(())
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.particles.validate()?;
        self.emitter.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./line_particles.toml
    /// 2. ./line_particles.json
    /// 3. 使用默认配置
    ///
    /// 文件存在但解析失败时返回错误，而不是静默回退。
    pub fn load_or_default() -> ConfigResult<(Self, ConfigSource)> {
        if Path::new(CONFIG_TOML).exists() {
            let config = Self::from_toml_file(CONFIG_TOML)?;
            return Ok((config, ConfigSource::Toml(CONFIG_TOML.to_string())));
        }
        if Path::new(CONFIG_JSON).exists() {
            let config = Self::from_json_file(CONFIG_JSON)?;
            return Ok((config, ConfigSource::Json(CONFIG_JSON.to_string())));
        }
        Ok((Self::default(), ConfigSource::Default))
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（`RUST_LOG` 优先）
    pub level: LogLevel,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 作为 `EnvFilter` 指令使用的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particles.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.emitter.spawn_rate, 10);
    }

    #[test]
    fn test_toml_serialization() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            [particles]
            capacity = 4096
            backend = "parallel"
            seed = 9

            [particles.spawn]
            reduction_rate = 0.5

            [emitter]
            spawn_rate = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.particles.capacity, 4096);
        assert_eq!(config.particles.backend, BackendKind::Parallel);
        assert_eq!(config.particles.seed, Some(9));
        assert_eq!(config.particles.spawn.reduction_rate, 0.5);
        assert_eq!(config.particles.spawn.speed_mag, 4.0);
        assert_eq!(config.emitter.spawn_rate, 25);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_json_serialization() {
        let config = EngineConfig::from_json_str(r#"{"particles": {"draw_mode": "immediate"}}"#)
            .unwrap();
        assert_eq!(config.particles.draw_mode, DrawMode::Immediate);
        assert!(EngineConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_save_and_reload() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");

        let mut config = EngineConfig::default();
        config.particles.capacity = 77;
        config.save_toml(&path)?;
        let loaded = EngineConfig::from_toml_file(&path)?;
        assert_eq!(loaded.particles.capacity, 77);
        Ok(())
    }
}
