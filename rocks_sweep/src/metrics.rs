// Benchmark result types
// 基准测试结果类型

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Bloom, Compaction, LatencyStats, ReadPath, RunConfig, TableFormat, WritePath};

/// Metrics of one timed phase
/// 单个计时阶段的指标
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseMetrics {
  /// Keys processed / 处理的 key 数
  pub ops: u64,
  pub duration_ns: u64,
  /// ops / sec, NaN when no ops / 每秒操作数，无操作时为 NaN
  pub throughput: f64,
  /// sec / op, NaN when no ops / 每操作秒数，无操作时为 NaN
  pub latency: f64,
  /// Per engine call / 每次引擎调用
  pub calls: LatencyStats,
  /// Failed keys / 失败的 key 数
  pub errors: u64,
}

impl PhaseMetrics {
  pub fn new(ops: u64, duration: Duration, calls: LatencyStats, errors: u64) -> Self {
    let (throughput, latency) = if ops == 0 {
      (f64::NAN, f64::NAN)
    } else {
      let secs = duration.as_secs_f64();
      (ops as f64 / secs, secs / ops as f64)
    };
    Self {
      ops,
      duration_ns: duration.as_nanos() as u64,
      throughput,
      latency,
      calls,
      errors,
    }
  }

  pub fn duration(&self) -> Duration {
    Duration::from_nanos(self.duration_ns)
  }

  /// Duration in seconds / 耗时（秒）
  pub fn secs(&self) -> f64 {
    self.duration().as_secs_f64()
  }
}

/// Result of one run, never mutated after creation
/// 单次运行结果，创建后不再修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
  pub size: usize,
  pub duplicates: f64,
  pub bloom: Bloom,
  pub compaction: Compaction,
  pub format: TableFormat,
  pub read_batch: usize,
  pub write_path: WritePath,
  pub read_path: ReadPath,
  pub path: PathBuf,
  pub engine: String,
  pub write: PhaseMetrics,
  pub read: PhaseMetrics,
  /// Keys reported present / 查到的 key 数
  pub found: u64,
  pub disk_bytes: u64,
  /// Process memory growth over the run / 运行期间进程内存增长
  pub mem_bytes: u64,
}

impl RunResult {
  pub fn new(
    conf: &RunConfig,
    engine: &str,
    write: PhaseMetrics,
    read: PhaseMetrics,
    found: u64,
    disk_bytes: u64,
    mem_bytes: u64,
  ) -> Self {
    Self {
      size: conf.key_count,
      duplicates: conf.duplicate_ratio,
      bloom: conf.bloom,
      compaction: conf.compaction,
      format: conf.format,
      read_batch: conf.read_batch,
      write_path: conf.write_path,
      read_path: conf.read_path,
      path: conf.path.clone(),
      engine: engine.to_owned(),
      write,
      read,
      found,
      disk_bytes,
      mem_bytes,
    }
  }
}
