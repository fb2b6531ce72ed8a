use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  /// Path or options rejected by the engine, fatal to one run
  /// 路径或配置被引擎拒绝，仅对单次运行致命
  #[error("open {path:?} failed: {msg}")]
  Open { path: PathBuf, msg: String },

  #[error("{op} of {count} keys failed: {msg}")]
  Write {
    op: &'static str,
    count: usize,
    msg: String,
  },

  #[error("{op} of {count} keys failed: {msg}")]
  Read {
    op: &'static str,
    count: usize,
    msg: String,
  },

  #[error("bulk ingest of {count} keys via {file:?} failed: {msg}")]
  Ingest {
    file: PathBuf,
    count: usize,
    msg: String,
  },

  /// Results file unusable, fatal to the process
  /// 结果文件不可用，进程级致命错误
  #[error("results file {path:?}: {source}")]
  Output {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("every run failed to open the engine ({0} attempted)")]
  NoEngine(usize),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Histogram error: {0}")]
  Histogram(#[from] hdrhistogram::CreationError),

  #[error("JSON error: {0}")]
  Json(#[from] sonic_rs::Error),

  #[cfg(feature = "rocksdb")]
  #[error("RocksDB error: {0}")]
  Rocks(#[from] rocksdb::Error),
}

impl Error {
  /// Engine-level error, logged and survived by the sweep
  /// 引擎级错误，记录日志后继续
  pub fn is_engine(&self) -> bool {
    !matches!(
      self,
      Error::Output { .. } | Error::NoEngine(_) | Error::Json(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
