//! 模拟磁盘: 块占用表
//!
//! [`DiskState`] 是一个显式持有的状态对象, 没有任何全局变量.
//! 它只记录每个块是空闲还是被占用, 不保存块中的数据, 也不记录块属于哪个文件.

use super::{Bitmap, FsError, Result, MAX_BLOCKS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Free,
    Occupied,
}

impl BlockState {
    pub fn is_free(&self) -> bool {
        *self == BlockState::Free
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskState {
    bitmap: Bitmap,
}

impl DiskState {
    /// 初始化一个有 total_blocks 个空闲块的磁盘, 上限为 [`MAX_BLOCKS`]
    pub fn init(total_blocks: usize) -> Result<Self> {
        Self::with_limit(total_blocks, MAX_BLOCKS)
    }

    /// 与 [`DiskState::init`] 相同, 但上限由调用者指定
    pub fn with_limit(total_blocks: usize, limit: usize) -> Result<Self> {
        if total_blocks == 0 {
            return Err(FsError::InvalidConfig(
                "block count must be positive".to_string(),
            ));
        }
        if total_blocks > limit {
            return Err(FsError::InvalidConfig(format!(
                "block count {} exceeds the limit of {}",
                total_blocks, limit
            )));
        }
        Ok(Self {
            bitmap: Bitmap::new(total_blocks),
        })
    }

    pub fn total_blocks(&self) -> usize {
        self.bitmap.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.bitmap.count_ones()
    }

    pub fn free_count(&self) -> usize {
        self.total_blocks() - self.occupied_count()
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.total_blocks() {
            return Err(FsError::OutOfRange {
                index,
                total: self.total_blocks(),
            });
        }
        Ok(())
    }

    pub fn is_free(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(!self.bitmap.get(index))
    }

    pub fn state(&self, index: usize) -> Result<BlockState> {
        Ok(if self.is_free(index)? {
            BlockState::Free
        } else {
            BlockState::Occupied
        })
    }

    /// 占用一个块, 已被占用的块保持不变
    pub fn occupy(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.bitmap.set(index);
        Ok(())
    }

    /// 释放一个块, 释放空闲块不是错误
    pub fn release(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.bitmap.clear(index);
        Ok(())
    }

    /// 按升序惰性地遍历空闲块
    ///
    /// 每次调用都会从块 0 重新开始; 迭代器借用磁盘, 遍历期间磁盘不会被修改.
    pub fn free_block_indices(&self) -> FreeBlocks<'_> {
        FreeBlocks {
            bitmap: &self.bitmap,
            next: 0,
        }
    }

    /// 只读快照, 按块的顺序排列
    pub fn snapshot(&self) -> Vec<BlockState> {
        (0..self.total_blocks())
            .map(|i| {
                if self.bitmap.get(i) {
                    BlockState::Occupied
                } else {
                    BlockState::Free
                }
            })
            .collect()
    }

    /// 占用向量: 被占用的块为 1, 空闲块为 0
    pub fn occupancy_vector(&self) -> Vec<u8> {
        (0..self.total_blocks())
            .map(|i| self.bitmap.get(i) as u8)
            .collect()
    }
}

/// [`DiskState::free_block_indices`] 返回的迭代器
#[derive(Clone)]
pub struct FreeBlocks<'a> {
    bitmap: &'a Bitmap,
    next: usize,
}

impl Iterator for FreeBlocks<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let bit = self.bitmap.next_zero(self.next)?;
        self.next = bit + 1;
        Some(bit)
    }
}
