//! 交互式菜单
//!
//! 读取命令和参数, 调用分配层, 再把结果格式化输出. 输入输出都是泛型的,
//! 测试时可以用内存中的缓冲区代替标准输入输出.

use std::{
    io::{self, BufRead, ErrorKind, Write},
    str::FromStr,
};

use log::{debug, info, warn};

use easy_alloc::fs::{AllocationEngine, CapacityStats, DiskState, Strategy, ROW_WIDTH};
use crate::render;

const MENU: &str = "What do you want to do?
Initialize the disk --> I
Show available disk space --> A
Save a file --> S
Delete a file --> D
Quit --> Q";

pub struct Shell<R, W> {
    input: R,
    output: W,
    engine: AllocationEngine,
    /// 磁盘块数上限
    limit: usize,
    /// 尚未初始化时为 None
    disk: Option<DiskState>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, engine: AllocationEngine, limit: usize) -> Self {
        Self {
            input,
            output,
            engine,
            limit,
            disk: None,
        }
    }

    #[cfg(test)]
    pub fn disk(&self) -> Option<&DiskState> {
        self.disk.as_ref()
    }

    /// 菜单循环, 直到 Q 或者输入结束
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            match self.step() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    info!("end of input");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 执行一条命令, 返回 false 表示退出
    fn step(&mut self) -> io::Result<bool> {
        let command = self.read_line()?;
        info!("command '{}'", command);
        match command.to_ascii_uppercase().as_str() {
            "I" => self.initialize()?,
            "A" => self.show_free()?,
            "S" => self.save()?,
            "D" => self.delete()?,
            "Q" => {
                writeln!(self.output, "bye")?;
                return Ok(false);
            }
            _ => writeln!(self.output, "invalid option, try again")?,
        }
        Ok(true)
    }

    fn initialize(&mut self) -> io::Result<()> {
        let total: Option<usize> = self.ask("number of disk blocks:")?;
        let block_size: Option<u32> = self.ask("block size (bytes):")?;
        let pointer_size: Option<u32> = self.ask("pointer size (bytes):")?;
        match (total, block_size, pointer_size) {
            (Some(total), Some(block_size), Some(pointer_size)) => {
                self.initialize_with(total, block_size, pointer_size)
            }
            _ => Ok(()),
        }
    }

    /// 计算统计量并初始化磁盘, 原有的磁盘被整体替换
    pub fn initialize_with(
        &mut self,
        total: usize,
        block_size: u32,
        pointer_size: u32,
    ) -> io::Result<()> {
        let result = CapacityStats::compute(total, block_size, pointer_size)
            .and_then(|stats| Ok((stats, DiskState::with_limit(total, self.limit)?)));
        match result {
            Ok((stats, disk)) => {
                info!("disk initialized with {} blocks", total);
                writeln!(self.output, "{}", render::stats(&stats))?;
                writeln!(self.output, "disk initialized with {} free blocks", total)?;
                self.disk = Some(disk);
            }
            Err(e) => {
                warn!("initialization failed: {}", e);
                writeln!(self.output, "{}", render::error(&e))?;
            }
        }
        Ok(())
    }

    fn show_free(&mut self) -> io::Result<()> {
        if let Some(disk) = &self.disk {
            writeln!(self.output, "{}", render::free_blocks(&disk.occupancy_vector()))?;
        }
        self.show_disk()
    }

    fn save(&mut self) -> io::Result<()> {
        if self.disk.is_none() {
            return writeln!(self.output, "disk is not initialized");
        }
        let size: Option<usize> = self.ask("file size (blocks):")?;
        let strategy: Option<Strategy> =
            self.ask("allocation method: chained --> C ; contiguous --> G ; indexed --> X :")?;
        let (size, strategy, disk) = match (size, strategy, self.disk.as_mut()) {
            (Some(size), Some(strategy), Some(disk)) => (size, strategy, disk),
            _ => return Ok(()),
        };
        match self.engine.allocate(disk, strategy, size) {
            Ok(allocation) => {
                info!("{} allocation of {} blocks succeeded", strategy, size);
                writeln!(self.output, "{}", render::allocation(&allocation))?;
            }
            Err(e) => {
                warn!("{} allocation of {} blocks failed: {}", strategy, size, e);
                writeln!(self.output, "{}", render::error(&e))?;
            }
        }
        self.show_disk()
    }

    fn delete(&mut self) -> io::Result<()> {
        if self.disk.is_none() {
            return writeln!(self.output, "disk is not initialized");
        }
        let size: Option<usize> = self.ask("file size (blocks):")?;
        let start: Option<usize> = self.ask("first block of the file:")?;
        let (size, start, disk) = match (size, start, self.disk.as_mut()) {
            (Some(size), Some(start), Some(disk)) => (size, start, disk),
            _ => return Ok(()),
        };
        match self.engine.delete(disk, start, size) {
            Ok(range) => {
                info!("released blocks {:?}", range);
                writeln!(
                    self.output,
                    "released {} blocks starting at block {}",
                    range.len(),
                    range.start
                )?;
            }
            Err(e) => writeln!(self.output, "{}", render::error(&e))?,
        }
        self.show_disk()
    }

    fn show_disk(&mut self) -> io::Result<()> {
        match &self.disk {
            Some(disk) => {
                writeln!(self.output, "current disk state:")?;
                write!(self.output, "{}", render::disk(&disk.snapshot(), ROW_WIDTH))
            }
            None => writeln!(self.output, "disk is not initialized"),
        }
    }

    /// 读取一行, 输入结束时返回 UnexpectedEof
    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(ErrorKind::UnexpectedEof, "end of input"));
        }
        Ok(line.trim().to_string())
    }

    /// 提问并解析回答, 无法解析时提示并返回 None
    fn ask<T: FromStr>(&mut self, question: &str) -> io::Result<Option<T>> {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;
        let answer = self.read_line()?;
        match answer.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                debug!("cannot parse '{}'", answer);
                writeln!(self.output, "invalid value '{}'", answer)?;
                Ok(None)
            }
        }
    }
}
