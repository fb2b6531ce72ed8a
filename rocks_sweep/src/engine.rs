// Engine adapter trait for the benchmark runner
// 基准运行器的引擎适配器 trait

use std::path::Path;

use hash_keys::Key;

use crate::{EngineConf, Result};

/// Calculate directory size iteratively / 迭代计算目录大小
pub fn dir_size(path: &Path) -> u64 {
  if !path.exists() {
    return 0;
  }
  let mut total = 0u64;
  let mut stack = vec![path.to_path_buf()];

  while let Some(current_path) = stack.pop() {
    if let Ok(entries) = std::fs::read_dir(&current_path) {
      for entry in entries.flatten() {
        let p = entry.path();
        if p.is_dir() {
          stack.push(p);
        } else {
          total += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
      }
    }
  }
  total
}

/// Get current process memory usage in bytes / 获取当前进程内存使用量（字节）
pub fn process_memory() -> u64 {
  memory_stats::memory_stats()
    .map(|s| s.physical_mem as u64)
    .unwrap_or(0)
}

/// Memory baseline, recorded before open
/// 内存基准点，在打开引擎前记录
#[derive(Debug, Clone, Copy)]
pub struct MemBaseline {
  baseline: u64,
}

impl MemBaseline {
  #[inline]
  pub fn record() -> Self {
    Self {
      baseline: process_memory(),
    }
  }

  /// Growth since baseline / 相对基准点的增长
  #[inline]
  pub fn growth(&self) -> u64 {
    process_memory().saturating_sub(self.baseline)
  }
}

/// Storage engine under test / 被测存储引擎
///
/// One instance lives for one run. `open` wipes whatever a previous run left
/// at the path. Dropping the engine releases it, so every exit path of a run
/// closes it exactly once.
/// 每个实例只存活一次运行。`open` 会清除路径上之前的数据。
/// 析构即释放，运行的每条退出路径都恰好关闭一次。
pub trait Engine: Sized {
  /// Destroy previous data at `path`, then open
  /// 清除 `path` 上的旧数据后打开
  fn open(path: &Path, conf: &EngineConf) -> Result<Self>;

  /// Engine name / 引擎名称
  fn name(&self) -> &str;

  /// Data directory path / 数据目录路径
  fn data_path(&self) -> &Path;

  /// Single key upsert / 单 key 写入
  fn put(&mut self, key: &Key, val: &[u8]) -> Result<()>;

  /// Atomic group write / 原子批量写入
  fn batch_put(&mut self, keys: &[Key], val: &[u8]) -> Result<()>;

  /// Build one sorted file and ingest it; `keys` sorted and distinct
  /// 构建有序文件并导入；`keys` 已排序且唯一
  fn bulk_ingest(&mut self, keys: &[Key], val: &[u8]) -> Result<()>;

  /// Presence of key / key 是否存在
  fn get(&mut self, key: &Key) -> Result<bool>;

  /// One status per key, input order / 每个 key 一个结果，与输入同序
  fn batch_get(&mut self, keys: &[Key]) -> Vec<Result<bool>>;

  /// Flush to disk / 刷盘
  fn sync(&mut self) -> Result<()>;

  /// Release engine resources / 释放引擎资源
  fn close(self) {
    drop(self)
  }

  /// Get disk usage in bytes / 获取磁盘使用量（字节）
  fn disk_usage(&self) -> u64 {
    dir_size(self.data_path())
  }
}
