//! 把分配层返回的结构化结果格式化成文本, 分配层自己从不格式化.

use std::fmt::Write;

use easy_alloc::fs::{Allocation, BlockState, CapacityStats, FsError};

/// 空闲块显示为 L, 占用块显示为 O, 每行 width 个块
pub fn disk(snapshot: &[BlockState], width: usize) -> String {
    let mut out = String::new();
    for row in snapshot.chunks(width.max(1)) {
        out.extend(row.iter().map(|state| match state {
            BlockState::Free => 'L',
            BlockState::Occupied => 'O',
        }));
        out.push('\n');
    }
    out
}

/// 根据占用向量列出空闲块, 0 表示空闲
pub fn free_blocks(occupancy: &[u8]) -> String {
    let indices: Vec<String> = occupancy
        .iter()
        .enumerate()
        .filter(|(_, used)| **used == 0)
        .map(|(i, _)| i.to_string())
        .collect();
    format!("free blocks ({}): {}", indices.len(), indices.join(" "))
}

pub fn stats(stats: &CapacityStats) -> String {
    let mut out = String::new();
    // 写入 String 不会失败
    let _ = writeln!(out, "disk has {} blocks", stats.total_blocks);
    let _ = writeln!(out, "block size is {} bytes", stats.block_size);
    let _ = writeln!(out, "pointer size is {} bytes", stats.pointer_size);
    let _ = writeln!(out, "a pointer block holds {} pointers", stats.pointers_per_block);
    let _ = writeln!(
        out,
        "max file size is {} data blocks",
        stats.max_theoretical_size
    );
    let _ = writeln!(out, "real max file size is {} blocks", stats.max_real_size);
    let _ = write!(out, "{}", stats.feasibility.explain());
    out
}

pub fn allocation(allocation: &Allocation) -> String {
    let blocks: Vec<String> = allocation.blocks.iter().map(|b| b.to_string()).collect();
    let mut out = format!(
        "{} file of {} blocks allocated: [{}]",
        allocation.strategy,
        allocation.requested,
        blocks.join(", ")
    );
    if let Some(index) = allocation.index_block {
        let _ = write!(out, " (index block {})", index);
    }
    out
}

pub fn error(err: &FsError) -> String {
    match err {
        FsError::InsufficientSpace { claimed, .. } if !claimed.is_empty() => {
            let blocks: Vec<String> = claimed.iter().map(|b| b.to_string()).collect();
            format!("error: {}; still occupied: [{}]", err, blocks.join(", "))
        }
        _ => format!("error: {}", err),
    }
}
