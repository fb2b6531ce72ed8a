// Run configuration
// 运行配置

use std::{fmt, path::PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Bloom filter bits per key / 布隆过滤器每 key 位数
pub const BLOOM_BITS_PER_KEY: u8 = 10;

/// Value stored for every key, only presence is measured
/// 每个 key 写入的值，只统计是否存在
pub const VALUE: &[u8] = b"1";

macro_rules! named_enum {
  ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $s:literal),+ $(,)? }) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
    pub enum $name {
      $(
        $(#[$vmeta])*
        #[value(name = $s)]
        #[serde(rename = $s)]
        $variant,
      )+
    }

    impl $name {
      pub fn as_str(self) -> &'static str {
        match self {
          $(Self::$variant => $s,)+
        }
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }
  };
}

named_enum!(
  /// Bloom filter switch / 布隆过滤器开关
  Bloom {
    On => "on",
    Off => "off",
  }
);

named_enum!(
  /// Compaction style / 压实策略
  Compaction {
    Leveled => "leveled",
    Universal => "universal",
  }
);

named_enum!(
  /// SST table format / SST 表格式
  TableFormat {
    BlockBased => "block-based",
    Plain => "plain",
    Cuckoo => "cuckoo",
  }
);

named_enum!(
  /// Ingestion path of the write phase / 写入阶段的导入方式
  WritePath {
    /// One put per key / 每个 key 一次 put
    SinglePut => "single-put",
    /// All keys in one write batch / 所有 key 一个写批次
    Batched => "batched",
    /// Sort, build one SST file, ingest it / 排序、构建 SST 文件并导入
    BulkIngest => "bulk-ingest",
  }
);

named_enum!(
  /// Lookup path of the read phase / 读取阶段的查询方式
  ReadPath {
    PointGet => "point-get",
    /// multi-get in chunks of `read_batch` / 按 `read_batch` 分块 multi-get
    BatchedGet => "batched-get",
  }
);

impl Bloom {
  #[inline]
  pub fn enabled(self) -> bool {
    self == Bloom::On
  }
}

/// What the engine adapter needs / 引擎适配器所需配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConf {
  pub bloom: Bloom,
  pub compaction: Compaction,
  pub format: TableFormat,
}

impl Default for EngineConf {
  fn default() -> Self {
    Self {
      bloom: Bloom::Off,
      compaction: Compaction::Leveled,
      format: TableFormat::BlockBased,
    }
  }
}

/// One point of the sweep, drives exactly one run
/// 扫描中的一个点，驱动一次运行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
  pub key_count: usize,
  pub duplicate_ratio: f64,
  pub bloom: Bloom,
  pub compaction: Compaction,
  pub format: TableFormat,
  pub read_batch: usize,
  pub write_path: WritePath,
  pub read_path: ReadPath,
  /// Flush memtable between write and read (untimed), so reads hit SST files
  /// 写读之间刷盘（不计时），使读取命中 SST 文件
  #[serde(default)]
  pub flush: bool,
  pub path: PathBuf,
}

impl RunConfig {
  /// Config with defaults for everything but size and path
  /// 除数量和路径外均为默认值的配置
  pub fn new(key_count: usize, path: impl Into<PathBuf>) -> Self {
    let engine = EngineConf::default();
    Self {
      key_count,
      duplicate_ratio: 0.0,
      bloom: engine.bloom,
      compaction: engine.compaction,
      format: engine.format,
      read_batch: 1,
      write_path: WritePath::Batched,
      read_path: ReadPath::PointGet,
      flush: false,
      path: path.into(),
    }
  }

  pub fn duplicate_ratio(mut self, ratio: f64) -> Self {
    self.duplicate_ratio = ratio;
    self
  }

  pub fn engine_conf(mut self, conf: EngineConf) -> Self {
    self.bloom = conf.bloom;
    self.compaction = conf.compaction;
    self.format = conf.format;
    self
  }

  /// Zero is treated as one / 0 视为 1
  pub fn read_batch(mut self, n: usize) -> Self {
    self.read_batch = n.max(1);
    self
  }

  pub fn write_path(mut self, path: WritePath) -> Self {
    self.write_path = path;
    self
  }

  pub fn read_path(mut self, path: ReadPath) -> Self {
    self.read_path = path;
    self
  }

  pub fn flush(mut self, flush: bool) -> Self {
    self.flush = flush;
    self
  }

  /// Project engine part / 提取引擎配置
  pub fn engine(&self) -> EngineConf {
    EngineConf {
      bloom: self.bloom,
      compaction: self.compaction,
      format: self.format,
    }
  }
}
