//! 帧时钟
//!
//! 单调递增的模拟时间，负的或非有限的帧间隔按 0 处理。

/// 帧时钟
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameClock {
    /// 当前时刻（秒）
    now: f32,
    /// 上一帧间隔（秒）
    delta: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进一帧，返回实际采用的间隔
    pub fn tick(&mut self, delta: f32) -> f32 {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.now += delta;
        self.delta = delta;
        delta
    }

    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }
}
