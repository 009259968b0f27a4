//! 统一错误处理模块
//!
//! 提供粒子系统范围内的错误类型定义
//!
//! ## 错误类型分层
//!
//! - **粒子层错误** (`ParticleError`): 槽位池耗尽、非法释放
//! - **配置层错误** (`config::ConfigError`): 配置文件读取、解析与验证
//!
//! `EngineError` 可以同时承载以上两层的错误。

use crate::config::ConfigError;
use thiserror::Error;

/// 非法释放的原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseFault {
    #[error("slot id is outside the pool")]
    OutOfRange,

    #[error("slot is already free")]
    AlreadyFree,
}

/// 粒子系统错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleError {
    /// 没有空闲槽位；`spawned` 为本次请求中已成功生成的粒子数
    #[error("Particle pool exhausted: capacity {capacity}, spawned {spawned} of {requested}")]
    PoolExhausted {
        capacity: u32,
        requested: u32,
        spawned: u32,
    },

    /// 重复释放或越界释放，属于调用方违反契约
    #[error("Invalid release of slot {slot}: {reason}")]
    InvalidRelease { slot: u32, reason: ReleaseFault },
}

impl ParticleError {
    /// 是否为池耗尽
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }
}

/// 引擎核心错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Particle error: {0}")]
    Particle(#[from] ParticleError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// 结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
pub type ParticleResult<T> = Result<T, ParticleError>;
