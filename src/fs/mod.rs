mod alloc;
mod bitmap;
mod capacity;
mod disk;
mod error;
mod shared;

/// 直接索引的数据块数
pub const DIRECT_BLOCKS: u64 = 10;
/// 为文件系统管理信息保留的块数
pub const MANAGEMENT_OVERHEAD: u64 = 23;
/// 默认的磁盘块数上限
pub const MAX_BLOCKS: usize = 200;
/// 显示磁盘时每行的块数
pub const ROW_WIDTH: usize = 10;

pub use alloc::{Allocation, AllocationEngine, PartialPolicy, Strategy};
pub use bitmap::Bitmap;
pub use capacity::{
    is_feasible, max_real_size, max_theoretical_size, pointers_per_block, CapacityStats,
    Feasibility,
};
pub use disk::{BlockState, DiskState, FreeBlocks};
pub use error::{FsError, Result};
pub use shared::SharedDisk;
