//! 磁盘占用位图
//!
//! 每个 bit 代表一个块的分配状态, 0 意味着空闲, 而 1 则意味着已经被占用.
//! 位图按 u64 分组, 每组打包 64 个 bit, 这样可以一次跳过一整组已满的块.
//!
//! 与磁盘上的位图不同, 这里的位图完全驻留在内存中, 大小正好覆盖 `len` 个块.

/// 一组 bit 的宽度
const GROUP_BITS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// 每个 u64 打包了 64 个块的状态
    groups: Vec<u64>,
    /// 位图管理的块数, 最后一组中超出 len 的 bit 永远为 0 且不会被访问
    len: usize,
}

impl Bitmap {
    /// 创建一个全部空闲的位图
    pub fn new(len: usize) -> Self {
        Self {
            groups: vec![0u64; (len + GROUP_BITS - 1) / GROUP_BITS],
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// 调用者保证 bit < len
    pub fn get(&self, bit: usize) -> bool {
        let (group, inner) = decomposition(bit);
        self.groups[group] & (1u64 << inner) != 0
    }

    pub fn set(&mut self, bit: usize) {
        let (group, inner) = decomposition(bit);
        self.groups[group] |= 1u64 << inner;
    }

    pub fn clear(&mut self, bit: usize) {
        let (group, inner) = decomposition(bit);
        self.groups[group] &= !(1u64 << inner);
    }

    /// 找到编号不小于 from 的第一个为 0 的 bit
    ///
    /// 先把起始组中 from 之前的 bit 看作 1, 再以组为单位遍历,
    /// 找到一个尚未全满的组之后通过 u64::trailing_ones 找到最低的一个 0 的位置.
    pub fn next_zero(&self, from: usize) -> Option<usize> {
        if from >= self.len {
            return None;
        }
        let (start_group, start_inner) = decomposition(from);
        // 起始组中 from 之前的位置全部视为已占用
        let head_mask = (1u64 << start_inner) - 1;
        self.groups[start_group..]
            .iter()
            .enumerate()
            .map(|(i, bits64)| {
                let bits64 = if i == 0 { *bits64 | head_mask } else { *bits64 };
                (start_group + i, bits64)
            })
            .find(|(_, bits64)| *bits64 != u64::MAX)
            .map(|(group, bits64)| group * GROUP_BITS + bits64.trailing_ones() as usize)
            // 最后一组里 len 之后的 bit 也是 0, 需要排除
            .filter(|bit| *bit < self.len)
    }

    /// 已置 1 的 bit 数量
    pub fn count_ones(&self) -> usize {
        self.groups.iter().map(|g| g.count_ones() as usize).sum()
    }
}

/// 将 bit 编号分解为组编号以及组内编号
fn decomposition(bit: usize) -> (usize, usize) {
    (bit / GROUP_BITS, bit % GROUP_BITS)
}
