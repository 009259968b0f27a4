//! 核心模块
//!
//! 包含引擎的核心功能：
//! - `engine` - 无窗口的帧循环
//! - `error` - 错误类型定义
//! - `time` - 帧时钟
//! - `macros` - 配置样板宏

pub mod engine;
pub mod error;
pub mod time;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{EngineError, EngineResult, ParticleError, ParticleResult, ReleaseFault};

// 重新导出主要类型
pub use engine::{Engine, FrameReport};
pub use time::FrameClock;
