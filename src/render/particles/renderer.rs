//! 渲染器接缝
//!
//! 核心只产出稠密的绘制批次，具体如何提交给图形 API 由宿主实现 `LineRenderer`。

use super::draw_batch::{DrawBatch, DrawIndirectArgs, LineDrawRecord};
use crate::config::DrawMode;

/// 宿主渲染器
pub trait LineRenderer {
    /// 立即模式：每条记录一次线段绘制
    fn draw_line(&mut self, record: &LineDrawRecord);

    /// 批量模式：一次间接绘制，实例数由 `args.instance_count` 给出
    fn draw_indirect(&mut self, instance_data: &[u8], args: DrawIndirectArgs);
}

/// 按绘制模式提交批次，返回发出的绘制调用数
pub fn submit<R: LineRenderer + ?Sized>(batch: &DrawBatch<'_>, renderer: &mut R, mode: DrawMode) -> usize {
    match mode {
        DrawMode::Immediate => {
            for record in batch.iter() {
                renderer.draw_line(record);
            }
            batch.len()
        }
        DrawMode::Indirect => {
            renderer.draw_indirect(batch.as_bytes(), batch.indirect_args());
            1
        }
    }
}

/// 只计数的渲染器，用于无图形环境运行和测试
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingRenderer {
    /// 绘制调用总数
    pub draw_calls: u64,
    /// 绘制的线段总数
    pub lines_drawn: u64,
    /// 最近一次间接绘制的参数
    pub last_indirect: Option<DrawIndirectArgs>,
}

impl LineRenderer for CountingRenderer {
    fn draw_line(&mut self, _record: &LineDrawRecord) {
        self.draw_calls += 1;
        self.lines_drawn += 1;
    }

    fn draw_indirect(&mut self, instance_data: &[u8], args: DrawIndirectArgs) {
        debug_assert_eq!(
            instance_data.len(),
            args.instance_count as usize * std::mem::size_of::<LineDrawRecord>()
        );
        self.draw_calls += 1;
        self.lines_drawn += u64::from(args.instance_count);
        self.last_indirect = Some(args);
    }
}
