use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 周期发射器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// 启动时是否发射
    pub enabled: bool,

    /// 每个固定步发射的粒子数
    pub spawn_rate: u32,

    /// 固定步长（秒）
    pub fixed_time_step: f32,

    /// 发射点
    pub origin: [f32; 3],

    /// 渐变索引
    pub gradient_index: u32,

    /// 单帧最多补跑的固定步数
    pub max_steps_per_frame: u32,
}

impl_default!(EmitterConfig {
    enabled: true,
    spawn_rate: 10,
    fixed_time_step: 0.02,
    origin: [0.0; 3],
    gradient_index: 1,
    max_steps_per_frame: 8,
});

impl EmitterConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.fixed_time_step.is_finite() && self.fixed_time_step > 0.0) {
            return Err(ConfigError::ValidationError(
                "Fixed time step must be positive".to_string(),
            ));
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::ValidationError(
                "At least one fixed step per frame is required".to_string(),
            ));
        }
        Ok(())
    }
}
