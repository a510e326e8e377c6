//! 日志输出到 stderr, 每行带有本地时间戳和日志级别.
//!
//! 日志级别先取环境变量 `LOG` (默认 warn), 命令行 `--log-level` 会覆盖它.

use std::io::Write;

use chrono::Local;
use env_logger::{Builder, Env};

fn builder(level: Option<&str>) -> Builder {
    let mut builder = Builder::from_env(Env::default().filter_or("LOG", "warn"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{} {:<5}] {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });
    builder
}

pub fn init(level: Option<&str>) {
    // 重复初始化时保留第一次安装的 logger
    let _ = builder(level).try_init();
}
