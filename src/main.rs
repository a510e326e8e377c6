use std::io;

use clap::{value_parser, Arg, ArgAction, Command};
use log::info;

use easy_alloc::fs::{AllocationEngine, PartialPolicy, MAX_BLOCKS};
use shell::Shell;

mod logging;
mod render;
mod shell;

fn cli() -> Command {
    Command::new("Easy Block Allocator")
        .about("Simulates chained, contiguous and indexed block allocation on a small disk")
        .arg(
            // 以下三个参数必须同时给出, 在进入菜单之前初始化磁盘
            Arg::new("blocks")
                .short('n')
                .long("blocks")
                .value_parser(value_parser!(usize))
                .requires_all(["block-size", "pointer-size"])
                .help("Number of disk blocks"),
        )
        .arg(
            Arg::new("block-size")
                .short('b')
                .long("block-size")
                .value_parser(value_parser!(u32))
                .requires_all(["blocks", "pointer-size"])
                .help("Size of a block in bytes"),
        )
        .arg(
            Arg::new("pointer-size")
                .short('p')
                .long("pointer-size")
                .value_parser(value_parser!(u32))
                .requires_all(["blocks", "block-size"])
                .help("Size of a block pointer in bytes"),
        )
        .arg(
            Arg::new("max-blocks")
                .short('m')
                .long("max-blocks")
                .value_parser(value_parser!(usize))
                .help("Upper limit for the number of disk blocks (default 200)"),
        )
        .arg(
            Arg::new("atomic")
                .long("atomic")
                .action(ArgAction::SetTrue)
                .help("Roll back chained/indexed allocations that run out of space"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_parser(["off", "error", "warn", "info", "debug", "trace"])
                .help("Log level (overrides the LOG environment variable)"),
        )
}

fn main() -> io::Result<()> {
    let matches = cli().get_matches();

    logging::init(matches.get_one::<String>("log-level").map(String::as_str));

    let policy = if matches.get_flag("atomic") {
        PartialPolicy::Rollback
    } else {
        PartialPolicy::Keep
    };
    let limit = matches
        .get_one::<usize>("max-blocks")
        .copied()
        .unwrap_or(MAX_BLOCKS);
    info!("policy {:?}, block limit {}", policy, limit);

    let stdin = io::stdin();
    let mut shell = Shell::new(
        stdin.lock(),
        io::stdout(),
        AllocationEngine::new(policy),
        limit,
    );

    if let (Some(&blocks), Some(&block_size), Some(&pointer_size)) = (
        matches.get_one::<usize>("blocks"),
        matches.get_one::<u32>("block-size"),
        matches.get_one::<u32>("pointer-size"),
    ) {
        shell.initialize_with(blocks, block_size, pointer_size)?;
    }

    shell.run()
}
