//! 渲染模块
//!
//! 只包含线段粒子系统；图形 API 的提交由宿主通过 [`particles::LineRenderer`] 完成。

pub mod particles;
