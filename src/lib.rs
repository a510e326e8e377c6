//! 块分配模拟器: 在一个由固定大小块组成的模拟磁盘上, 演示链接分配, 连续分配和索引分配.

pub mod fs;

#[cfg(test)]
mod test;
