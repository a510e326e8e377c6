use thiserror::Error;

/// 分配层的错误类型
///
/// 所有错误都是正常的, 可以预期的结果, 以数据的形式返回给调用者
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// 非正数或超出上限的配置参数
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// 块编号不在 [0, total) 之内
    #[error("block {index} out of range (disk has {total} blocks)")]
    OutOfRange { index: usize, total: usize },

    /// 空闲块不足
    ///
    /// claimed 是失败后仍然处于占用状态的块 (链接/索引分配的部分占用),
    /// 连续分配或回滚模式下为空
    #[error("insufficient space: requested {requested} blocks, {} left claimed", claimed.len())]
    InsufficientSpace {
        requested: usize,
        claimed: Vec<usize>,
    },
}

pub type Result<T> = std::result::Result<T, FsError>;
