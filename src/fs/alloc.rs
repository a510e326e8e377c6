//! 分配引擎: 链接分配, 连续分配, 索引分配以及删除
//!
//! 引擎本身只保存策略配置, 不记录文件. 每次分配都返回一个 [`Allocation`],
//! 由调用者持有, 之后再用它 (或者起始块和块数) 来释放这些块.

use std::{fmt, ops::Range, str::FromStr};

use super::{DiskState, FsError, Result};

/// 分配方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// 链接分配: 按升序占用任意空闲块, "链" 只体现在返回的块顺序上
    Chained,
    /// 连续分配: 首次适配, 选择编号最小的连续空闲窗口
    Contiguous,
    /// 索引分配: 一个索引块加上若干数据块
    Indexed,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Chained => "chained",
            Strategy::Contiguous => "contiguous",
            Strategy::Indexed => "indexed",
        };
        f.write_str(name)
    }
}

impl FromStr for Strategy {
    type Err = FsError;

    /// 接受菜单字母 (C / G / X) 或者完整名称
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "chained" => Ok(Strategy::Chained),
            "g" | "contiguous" => Ok(Strategy::Contiguous),
            "x" | "indexed" => Ok(Strategy::Indexed),
            other => Err(FsError::InvalidConfig(format!(
                "unknown allocation strategy '{}'",
                other
            ))),
        }
    }
}

/// 空间不足时如何处理已经占用的块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialPolicy {
    /// 保留已经占用的块, 在错误中把它们交还给调用者 (链接/索引分配)
    #[default]
    Keep,
    /// 回滚: 三种方法都是全有或全无
    Rollback,
}

/// 一次成功分配的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub strategy: Strategy,
    pub requested: usize,
    /// 数据块, 按分配顺序排列, 长度等于 requested
    pub blocks: Vec<usize>,
    /// 索引分配使用的索引块
    pub index_block: Option<usize>,
}

impl Allocation {
    /// 该文件占用的全部块, 包括索引块
    pub fn all_blocks(&self) -> impl Iterator<Item = usize> + '_ {
        self.index_block.iter().copied().chain(self.blocks.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine {
    policy: PartialPolicy,
}

impl AllocationEngine {
    pub fn new(policy: PartialPolicy) -> Self {
        Self { policy }
    }

    /// 为一个 requested 块大小的文件分配空间
    ///
    /// 成功时返回的数据块数量等于 requested.
    /// 失败时返回 [`FsError::InsufficientSpace`], 其中 claimed 是仍被占用的块.
    pub fn allocate(
        &self,
        disk: &mut DiskState,
        strategy: Strategy,
        requested: usize,
    ) -> Result<Allocation> {
        match strategy {
            Strategy::Chained => self.chained(disk, requested),
            Strategy::Contiguous => contiguous(disk, requested),
            Strategy::Indexed => self.indexed(disk, requested),
        }
    }

    fn chained(&self, disk: &mut DiskState, requested: usize) -> Result<Allocation> {
        let blocks: Vec<usize> = disk.free_block_indices().take(requested).collect();
        occupy_all(disk, &blocks)?;
        if blocks.len() < requested {
            return Err(self.insufficient(disk, requested, blocks)?);
        }
        Ok(Allocation {
            strategy: Strategy::Chained,
            requested,
            blocks,
            index_block: None,
        })
    }

    fn indexed(&self, disk: &mut DiskState, requested: usize) -> Result<Allocation> {
        // 第一个空闲块作为索引块, 之后的空闲块作为数据块
        let mut free = disk.free_block_indices();
        let index_block = match free.next() {
            Some(index) => index,
            // 没有空闲块时, 空文件不需要索引块
            None if requested == 0 => {
                return Ok(Allocation {
                    strategy: Strategy::Indexed,
                    requested,
                    blocks: Vec::new(),
                    index_block: None,
                })
            }
            None => {
                return Err(FsError::InsufficientSpace {
                    requested,
                    claimed: Vec::new(),
                })
            }
        };
        let blocks: Vec<usize> = free.take(requested).collect();
        disk.occupy(index_block)?;
        occupy_all(disk, &blocks)?;
        if blocks.len() < requested {
            let mut claimed = Vec::with_capacity(blocks.len() + 1);
            claimed.push(index_block);
            claimed.extend(blocks);
            return Err(self.insufficient(disk, requested, claimed)?);
        }
        Ok(Allocation {
            strategy: Strategy::Indexed,
            requested,
            blocks,
            index_block: Some(index_block),
        })
    }

    /// 按策略处理部分占用的块, 生成空间不足的错误
    fn insufficient(
        &self,
        disk: &mut DiskState,
        requested: usize,
        claimed: Vec<usize>,
    ) -> Result<FsError> {
        let claimed = match self.policy {
            PartialPolicy::Keep => claimed,
            PartialPolicy::Rollback => {
                for &block in &claimed {
                    disk.release(block)?;
                }
                Vec::new()
            }
        };
        Ok(FsError::InsufficientSpace { requested, claimed })
    }

    /// 释放 [start, start + count), 超出磁盘的部分被截断
    ///
    /// 不检查这些块是否属于同一个文件, 释放空闲块也不是错误.
    /// 返回实际释放的范围.
    pub fn delete(&self, disk: &mut DiskState, start: usize, count: usize) -> Result<Range<usize>> {
        let end = start.saturating_add(count).min(disk.total_blocks());
        let start = start.min(end);
        for block in start..end {
            disk.release(block)?;
        }
        Ok(start..end)
    }

    /// 释放一次分配记录中的全部块
    pub fn release(&self, disk: &mut DiskState, allocation: &Allocation) -> Result<()> {
        for block in allocation.all_blocks() {
            disk.release(block)?;
        }
        Ok(())
    }
}

/// 连续分配 (首次适配)
///
/// 一边扫描一边记录当前空闲段的长度, 第一次达到 requested 时的窗口就是
/// 起点最小的可用窗口. 找不到时磁盘保持不变.
fn contiguous(disk: &mut DiskState, requested: usize) -> Result<Allocation> {
    let mut window = None;
    if requested > 0 {
        let mut run = 0;
        for i in 0..disk.total_blocks() {
            if disk.is_free(i)? {
                run += 1;
                if run == requested {
                    window = Some(i + 1 - requested);
                    break;
                }
            } else {
                run = 0;
            }
        }
    } else {
        window = Some(0);
    }

    let start = window.ok_or(FsError::InsufficientSpace {
        requested,
        claimed: Vec::new(),
    })?;
    let blocks: Vec<usize> = (start..start + requested).collect();
    occupy_all(disk, &blocks)?;
    Ok(Allocation {
        strategy: Strategy::Contiguous,
        requested,
        blocks,
        index_block: None,
    })
}

fn occupy_all(disk: &mut DiskState, blocks: &[usize]) -> Result<()> {
    for &block in blocks {
        disk.occupy(block)?;
    }
    Ok(())
}
