// RocksDB sweep benchmark library
// RocksDB 扫描基准测试库

#![cfg_attr(docsrs, feature(doc_cfg))]

mod adapter;
mod conf;
mod engine;
mod error;
mod latency;
mod metrics;
mod report;
mod runner;
mod sweep;

pub use adapter::mem::MemAdapter;
#[cfg(feature = "rocksdb")]
pub use adapter::rocksdb::{RocksDbAdapter, options as rocksdb_options};
pub use conf::{
  BLOOM_BITS_PER_KEY, Bloom, Compaction, EngineConf, ReadPath, RunConfig, TableFormat, VALUE,
  WritePath,
};
pub use engine::{Engine, MemBaseline, dir_size, process_memory};
pub use error::{Error, Result};
pub use latency::{LatencyHistogram, LatencyStats};
pub use metrics::{PhaseMetrics, RunResult};
pub use report::{CSV_HEADER, CsvSink, csv_row, print_summary, summary, write_csv, write_json};
pub use runner::Runner;
pub use sweep::{Axes, Sweep, SweepOutcome};
