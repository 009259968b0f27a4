//! 空闲槽位分配器
//!
//! 以数组实现的最小二叉堆（1 起始索引：`parent = n / 2`，`children = 2n, 2n + 1`）。
//! `acquire` 总是返回当前最小的空闲槽位，`acquire` / `release` 均为 O(log n)。
//! 堆存储在初始化时一次性预留，稳态运行期间不再分配内存。

use crate::core::error::{ParticleError, ParticleResult, ReleaseFault};

/// 槽位 ID
pub type SlotId = u32;

/// 最小堆空闲列表
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    /// 堆存储，下标 0 为占位元素
    heap: Vec<SlotId>,
    /// 每个槽位当前是否空闲（用于检测重复释放）
    free: Vec<bool>,
    /// ID 宇宙大小 `[0, capacity)`
    capacity: u32,
}

impl SlotAllocator {
    /// 创建分配器，所有 `capacity` 个 ID 均为空闲
    pub fn new(capacity: u32) -> Self {
        let mut allocator = Self {
            heap: Vec::new(),
            free: Vec::new(),
            capacity: 0,
        };
        allocator.initialize(capacity);
        allocator
    }

    /// 重新初始化为全部空闲
    pub fn initialize(&mut self, capacity: u32) {
        self.capacity = capacity;

        self.heap.clear();
        self.heap.reserve(capacity as usize + 1);
        self.heap.push(0);
        // 升序序列本身就满足最小堆性质
        self.heap.extend(0..capacity);

        self.free.clear();
        self.free.resize(capacity as usize, true);

        tracing::debug!(target: "particles", capacity, "slot allocator initialized");
    }

    /// 取出最小的空闲槽位
    pub fn acquire(&mut self) -> ParticleResult<SlotId> {
        if self.is_empty() {
            return Err(ParticleError::PoolExhausted {
                capacity: self.capacity,
                requested: 1,
                spawned: 0,
            });
        }

        // 末尾元素移到根，再下滤
        let slot = self.heap.swap_remove(1);
        self.sift_down(1);
        self.free[slot as usize] = false;
        Ok(slot)
    }

    /// 归还槽位
    ///
    /// 越界或重复释放返回 `InvalidRelease`，堆保持不变。
    pub fn release(&mut self, slot: SlotId) -> ParticleResult<()> {
        match self.free.get(slot as usize).copied() {
            None => Err(ParticleError::InvalidRelease {
                slot,
                reason: ReleaseFault::OutOfRange,
            }),
            Some(true) => Err(ParticleError::InvalidRelease {
                slot,
                reason: ReleaseFault::AlreadyFree,
            }),
            Some(false) => {
                self.free[slot as usize] = true;
                self.heap.push(slot);
                let last = self.heap.len() - 1;
                self.sift_up(last);
                Ok(())
            }
        }
    }

    /// 查看下一次 `acquire` 会返回的槽位
    pub fn peek(&self) -> Option<SlotId> {
        self.heap.get(1).copied()
    }

    /// 空闲槽位数
    pub fn len(&self) -> usize {
        self.heap.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.heap.len() <= 1
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// 槽位是否空闲；越界返回 `false`
    pub fn is_free(&self, slot: SlotId) -> bool {
        self.free.get(slot as usize).copied().unwrap_or(false)
    }

    /// 递归校验每个节点都小于其子节点
    ///
    /// 仅供测试使用，不要在每帧路径上调用。
    pub fn satisfies_heap_invariant(&self) -> bool {
        self.node_satisfies_invariant(1)
    }

    fn node_satisfies_invariant(&self, n: usize) -> bool {
        let left = n * 2;
        let right = left + 1;
        let len = self.heap.len();

        if left < len && (self.heap[n] >= self.heap[left] || !self.node_satisfies_invariant(left)) {
            return false;
        }
        if right < len && (self.heap[n] >= self.heap[right] || !self.node_satisfies_invariant(right)) {
            return false;
        }
        true
    }

    fn sift_up(&mut self, mut n: usize) {
        while n > 1 && self.heap[n] < self.heap[n / 2] {
            self.heap.swap(n, n / 2);
            n /= 2;
        }
    }

    fn sift_down(&mut self, mut n: usize) {
        let len = self.heap.len();
        loop {
            let left = n * 2;
            if left >= len {
                break;
            }
            let right = left + 1;
            // 只有左孩子时（非满二叉树的最后一层）直接与左孩子比较
            let child = if right < len && self.heap[right] < self.heap[left] {
                right
            } else {
                left
            };
            if self.heap[child] < self.heap[n] {
                self.heap.swap(n, child);
                n = child;
            } else {
                break;
            }
        }
    }
}
