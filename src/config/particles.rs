use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::render::particles::pool::{DEFAULT_LENGTH_MAG, DEFAULT_REDUCTION_RATE, DEFAULT_SPEED_MAG};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 默认池容量
pub const DEFAULT_CAPACITY: u32 = 1024 * 2048;

/// 粒子系统配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// 池容量（同时存活的最大粒子数）
    pub capacity: u32,

    /// 颜色渐变纹理高度
    pub gradient_height: u32,

    /// 执行后端
    pub backend: BackendKind,

    /// 绘制提交方式
    pub draw_mode: DrawMode,

    /// 随机种子（None 表示使用系统熵源）
    pub seed: Option<u64>,

    /// 池耗尽时的处理方式
    pub exhaustion: ExhaustionPolicy,

    /// 生成参数默认值
    pub spawn: SpawnDefaults,

    /// 并行后端的块大小
    pub parallel_chunk_size: usize,
}

impl_default!(ParticleConfig {
    capacity: DEFAULT_CAPACITY,
    gradient_height: 16,
    backend: BackendKind::Sequential,
    draw_mode: DrawMode::Indirect,
    seed: None,
    exhaustion: ExhaustionPolicy::DropLogged,
    spawn: SpawnDefaults::default(),
    parallel_chunk_size: 4096,
});

impl ParticleConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "Particle capacity must be positive".to_string(),
            ));
        }
        if self.gradient_height == 0 {
            return Err(ConfigError::ValidationError(
                "Gradient height must be positive".to_string(),
            ));
        }
        if self.parallel_chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "Parallel chunk size must be positive".to_string(),
            ));
        }
        self.spawn.validate()
    }
}

/// 生成参数默认值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnDefaults {
    pub speed_mag: f32,
    pub length_mag: f32,
    /// 允许为负（按绝对值使用）
    pub reduction_rate: f32,
}

impl_default!(SpawnDefaults {
    speed_mag: DEFAULT_SPEED_MAG,
    length_mag: DEFAULT_LENGTH_MAG,
    reduction_rate: DEFAULT_REDUCTION_RATE,
});

impl SpawnDefaults {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.speed_mag.is_finite() || !self.length_mag.is_finite() {
            return Err(ConfigError::ValidationError(
                "Spawn magnitudes must be finite".to_string(),
            ));
        }
        if !self.reduction_rate.is_finite() || self.reduction_rate.abs() > 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "Reduction rate {} must lie within [-1, 1]",
                self.reduction_rate
            )));
        }
        Ok(())
    }
}

/// 执行后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// 单线程顺序循环
    Sequential,
    /// 按块并行
    Parallel,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "cpu" => Ok(Self::Sequential),
            "parallel" | "gpu" => Ok(Self::Parallel),
            other => Err(ConfigError::ParseError(format!("Unknown backend: {other}"))),
        }
    }
}

/// 绘制提交方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// 每条记录一次绘制
    Immediate,
    /// 一次间接绘制
    Indirect,
}

/// 池耗尽时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// 静默丢弃
    Drop,
    /// 丢弃并记录警告
    DropLogged,
    /// 返回错误给调用方
    Propagate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ParticleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let config = ParticleConfig {
            capacity: 0,
            ..ParticleConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = ParticleConfig::default();
        config.spawn.reduction_rate = 1.5;
        assert!(config.validate().is_err());

        // 负值按绝对值使用，允许
        config.spawn.reduction_rate = -0.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Parallel".parse::<BackendKind>().unwrap(), BackendKind::Parallel);
        assert_eq!(" cpu ".parse::<BackendKind>().unwrap(), BackendKind::Sequential);
        assert!("vulkan".parse::<BackendKind>().is_err());
    }
}
