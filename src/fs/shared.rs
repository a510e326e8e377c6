//! 多个调用者共享同一个磁盘时, 整个 [`DiskState`] 由一把互斥锁保护.
//!
//! 每次分配/删除/初始化都在持锁期间完成, 所以它们各自是原子的;
//! 但跨操作的事务并不存在.

use std::{ops::Range, sync::Arc};

use spin::Mutex;

use super::{Allocation, AllocationEngine, BlockState, DiskState, Result, Strategy};

#[derive(Clone)]
pub struct SharedDisk {
    disk: Arc<Mutex<DiskState>>,
    engine: AllocationEngine,
}

impl SharedDisk {
    pub fn new(disk: DiskState, engine: AllocationEngine) -> Self {
        Self {
            disk: Arc::new(Mutex::new(disk)),
            engine,
        }
    }

    pub fn allocate(&self, strategy: Strategy, requested: usize) -> Result<Allocation> {
        let mut disk = self.disk.lock();
        self.engine.allocate(&mut disk, strategy, requested)
    }

    pub fn delete(&self, start: usize, count: usize) -> Result<Range<usize>> {
        let mut disk = self.disk.lock();
        self.engine.delete(&mut disk, start, count)
    }

    pub fn release(&self, allocation: &Allocation) -> Result<()> {
        let mut disk = self.disk.lock();
        self.engine.release(&mut disk, allocation)
    }

    /// 整体替换磁盘
    pub fn reinit(&self, disk: DiskState) {
        *self.disk.lock() = disk;
    }

    pub fn snapshot(&self) -> Vec<BlockState> {
        self.disk.lock().snapshot()
    }

    /// 在持锁期间对磁盘执行一个只读函数
    pub fn read<V>(&self, f: impl FnOnce(&DiskState) -> V) -> V {
        let disk = self.disk.lock();
        f(&*disk)
    }
}
