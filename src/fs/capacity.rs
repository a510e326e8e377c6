//! 容量计算: 纯函数, 没有任何可变状态
//!
//! 一个文件的索引结构由 [`DIRECT_BLOCKS`] 个直接索引, 以及一级/二级/三级间接索引组成.
//! 一个索引块能放下 `block_size / pointer_size` 个指针, 记为 p, 于是:
//!
//! - 直接索引可以找到 10 个数据块
//! - 一级间接索引指向一个索引块, 可以找到 p 个数据块
//! - 二级间接索引可以找到 p * p 个数据块
//! - 三级间接索引可以找到 p * p * p 个数据块
//!
//! 理论上限再加上 [`MANAGEMENT_OVERHEAD`] 个管理块, 但实际上限不能超过磁盘总块数.

use super::{FsError, Result, DIRECT_BLOCKS, MANAGEMENT_OVERHEAD};

/// 一个索引块可以容纳的指针数量 (向下取整)
pub fn pointers_per_block(block_size: u32, pointer_size: u32) -> Result<u64> {
    if pointer_size == 0 {
        return Err(FsError::InvalidConfig(
            "pointer size must be positive".to_string(),
        ));
    }
    Ok((block_size / pointer_size) as u64)
}

/// 文件的理论最大大小 (数据块数): 10 + p + p^2 + p^3
///
/// 溢出时饱和到 `u64::MAX`, 不会回绕. 实际上限总会被磁盘总块数截断, 所以饱和值不会泄露到
/// [`max_real_size`] 的结果中.
pub fn max_theoretical_size(pointers_per_block: u64) -> u64 {
    let p = pointers_per_block;
    let p2 = p.saturating_mul(p);
    let p3 = p2.saturating_mul(p);
    DIRECT_BLOCKS
        .saturating_add(p)
        .saturating_add(p2)
        .saturating_add(p3)
}

/// 实际最大大小: min(total_blocks, 理论大小 + 管理块)
pub fn max_real_size(pointers_per_block: u64, total_blocks: usize) -> u64 {
    let with_overhead = max_theoretical_size(pointers_per_block).saturating_add(MANAGEMENT_OVERHEAD);
    with_overhead.min(total_blocks as u64)
}

/// 判断文件系统是否可实现
pub fn is_feasible(total_blocks: usize, max_real_size: u64) -> bool {
    max_real_size <= total_blocks as u64
}

/// 可行性判断结果, 与它的文字解释分离
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    Feasible,
    NotEnoughBlocks,
}

impl Feasibility {
    pub fn check(total_blocks: usize, max_real_size: u64) -> Self {
        if is_feasible(total_blocks, max_real_size) {
            Feasibility::Feasible
        } else {
            Feasibility::NotEnoughBlocks
        }
    }

    pub fn is_feasible(&self) -> bool {
        *self == Feasibility::Feasible
    }

    /// 给调用者显示的文字解释
    pub fn explain(&self) -> &'static str {
        match self {
            Feasibility::Feasible => "file system is feasible: allocation possible",
            Feasibility::NotEnoughBlocks => "file system is not feasible: not enough blocks available",
        }
    }
}

/// 由 (总块数, 块大小, 指针大小) 推导出的全部统计量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityStats {
    pub total_blocks: usize,
    pub block_size: u32,
    pub pointer_size: u32,
    pub pointers_per_block: u64,
    pub max_theoretical_size: u64,
    pub max_real_size: u64,
    pub feasibility: Feasibility,
}

impl CapacityStats {
    /// 三个输入都必须为正数
    pub fn compute(total_blocks: usize, block_size: u32, pointer_size: u32) -> Result<Self> {
        if total_blocks == 0 {
            return Err(FsError::InvalidConfig(
                "block count must be positive".to_string(),
            ));
        }
        if block_size == 0 {
            return Err(FsError::InvalidConfig(
                "block size must be positive".to_string(),
            ));
        }
        let pointers_per_block = pointers_per_block(block_size, pointer_size)?;
        let max_real_size = max_real_size(pointers_per_block, total_blocks);
        Ok(Self {
            total_blocks,
            block_size,
            pointer_size,
            pointers_per_block,
            max_theoretical_size: max_theoretical_size(pointers_per_block),
            max_real_size,
            feasibility: Feasibility::check(total_blocks, max_real_size),
        })
    }
}
