//! 绘制批次构建
//!
//! 每帧把存活粒子压缩成连续的绘制记录序列，屏蔽槽位的稀疏性。
//! 输出缓冲区按池容量一次性分配，帧内不会重新分配。

use glam::{Vec2, Vec3, Vec4};

/// 线段最短可见长度对应的速度偏移
pub const MIN_SEGMENT_SPEED: f32 = 0.0625;
/// 线段长度缩放分母
pub const LENGTH_DIVISOR: f32 = 10.0;
/// 每条线段的顶点数
pub const LINE_VERTEX_COUNT: u32 = 2;

/// 单条线段的绘制记录（对应着色器端 3 个 float4 的步长）
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineDrawRecord {
    /// 线段头部
    pub head_position: [f32; 4],
    /// 线段尾部
    pub tail_position: [f32; 4],
    /// (lifetime, colorSamplingV)
    pub color_sample_coordinate: [f32; 2],
    /// 填充
    pub _padding: [f32; 2],
}

impl LineDrawRecord {
    /// 由粒子当前状态生成记录
    pub fn new(
        position: Vec4,
        forward: Vec3,
        current_speed: f32,
        length_mag: f32,
        lifetime: f32,
        color_sampling_v: f32,
    ) -> Self {
        let length = (current_speed + MIN_SEGMENT_SPEED) * length_mag / LENGTH_DIVISOR;
        let tail = position + forward.extend(0.0) * length;
        Self {
            head_position: position.to_array(),
            tail_position: tail.to_array(),
            color_sample_coordinate: [lifetime, color_sampling_v],
            _padding: [0.0; 2],
        }
    }

    pub fn head(&self) -> Vec4 {
        Vec4::from_array(self.head_position)
    }

    pub fn tail(&self) -> Vec4 {
        Vec4::from_array(self.tail_position)
    }

    pub fn color_sample(&self) -> Vec2 {
        Vec2::from_array(self.color_sample_coordinate)
    }
}

/// 间接绘制参数
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawIndirectArgs {
    /// 顶点数
    pub vertex_count: u32,
    /// 实例数
    pub instance_count: u32,
    /// 第一个顶点
    pub first_vertex: u32,
    /// 第一个实例
    pub first_instance: u32,
}

impl DrawIndirectArgs {
    /// 以存活数为实例数的线段绘制参数
    pub fn lines(instance_count: u32) -> Self {
        Self {
            vertex_count: LINE_VERTEX_COUNT,
            instance_count,
            first_vertex: 0,
            first_instance: 0,
        }
    }
}

/// 一帧的只读绘制批次
#[derive(Debug, Clone, Copy)]
pub struct DrawBatch<'a> {
    records: &'a [LineDrawRecord],
}

impl<'a> DrawBatch<'a> {
    pub fn new(records: &'a [LineDrawRecord]) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &'a [LineDrawRecord] {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'a, LineDrawRecord> {
        self.records.iter()
    }

    /// 供上传到实例缓冲区的字节视图
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.records)
    }

    pub fn indirect_args(&self) -> DrawIndirectArgs {
        DrawIndirectArgs::lines(self.records.len() as u32)
    }
}

impl<'a> IntoIterator for DrawBatch<'a> {
    type Item = &'a LineDrawRecord;
    type IntoIter = std::slice::Iter<'a, LineDrawRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// 绘制批次构建器
///
/// 只持有每帧的临时缓冲区，不保存跨帧状态；`live_count` 之后的内容无效。
pub struct DrawBatchBuilder {
    records: Vec<LineDrawRecord>,
    live_count: usize,
}

impl DrawBatchBuilder {
    /// 按池容量预分配
    pub fn new(capacity: usize) -> Self {
        Self {
            records: vec![LineDrawRecord::default(); capacity],
            live_count: 0,
        }
    }

    /// 开始新的一帧
    pub fn begin(&mut self) {
        self.live_count = 0;
    }

    /// 追加一条记录
    #[inline]
    pub fn push(&mut self, record: LineDrawRecord) {
        debug_assert!(self.live_count < self.records.len(), "draw buffer overflow");
        if let Some(slot) = self.records.get_mut(self.live_count) {
            *slot = record;
            self.live_count += 1;
        }
    }

    /// 追加一段连续记录
    pub fn extend_from_slice(&mut self, records: &[LineDrawRecord]) {
        let end = self.live_count + records.len();
        debug_assert!(end <= self.records.len(), "draw buffer overflow");
        let end = end.min(self.records.len());
        let count = end - self.live_count;
        self.records[self.live_count..end].copy_from_slice(&records[..count]);
        self.live_count = end;
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    pub fn batch(&self) -> DrawBatch<'_> {
        DrawBatch::new(&self.records[..self.live_count])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        assert_eq!(std::mem::size_of::<LineDrawRecord>(), 48);
        assert_eq!(std::mem::size_of::<DrawIndirectArgs>(), 16);
    }

    #[test]
    fn test_tail_has_minimum_length() {
        let record = LineDrawRecord::new(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec3::Y, 0.0, 6.0, 0.5, 0.25);
        let tail = record.tail();
        assert!((tail.y - 0.0625 * 6.0 / 10.0).abs() < 1e-6);
        assert_eq!(tail.w, 1.0);
        assert_eq!(record.color_sample(), Vec2::new(0.5, 0.25));
    }

    #[test]
    fn test_builder_keeps_only_valid_prefix() {
        let mut builder = DrawBatchBuilder::new(4);
        let record = LineDrawRecord::new(Vec4::W, Vec3::X, 1.0, 6.0, 0.1, 0.5);
        builder.push(record);
        builder.push(record);
        assert_eq!(builder.batch().len(), 2);

        builder.begin();
        builder.push(record);
        let batch = builder.batch();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.indirect_args(), DrawIndirectArgs::lines(1));
        assert_eq!(batch.as_bytes().len(), 48);
        assert_eq!(builder.capacity(), 4);
    }

    #[test]
    fn test_extend_from_slice() {
        let mut builder = DrawBatchBuilder::new(8);
        let records = [LineDrawRecord::default(); 3];
        builder.extend_from_slice(&records);
        builder.extend_from_slice(&records[..2]);
        assert_eq!(builder.live_count(), 5);
    }
}
