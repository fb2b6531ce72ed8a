// Benchmark runner: generate, write, read, close
// 基准测试运行器：生成、写入、读取、关闭

use std::time::{Duration, Instant};

use hash_keys::{Key, KeyGen, KeySet};
use log::{error, info};

use crate::{
  Engine, LatencyHistogram, MemBaseline, PhaseMetrics, ReadPath, Result, RunConfig, RunResult,
  VALUE, WritePath,
};

/// Outcome of one timed phase before metrics are derived
/// 计时阶段的原始结果
struct Phase {
  duration: Duration,
  hist: LatencyHistogram,
  errors: u64,
  found: u64,
}

impl Phase {
  fn metrics(&self, ops: usize) -> PhaseMetrics {
    PhaseMetrics::new(ops as u64, self.duration, self.hist.stats(), self.errors)
  }
}

/// Benchmark runner / 基准测试运行器
pub struct Runner {
  keygen: KeyGen,
}

impl Default for Runner {
  fn default() -> Self {
    Self::new()
  }
}

impl Runner {
  pub fn new() -> Self {
    Self {
      keygen: KeyGen::new(),
    }
  }

  /// Create runner with seed for reproducibility
  /// 使用种子创建运行器以实现可重现性
  pub fn with_seed(seed: u64) -> Self {
    Self {
      keygen: KeyGen::with_seed(seed),
    }
  }

  /// Run one configuration point
  /// 运行单个配置点
  ///
  /// Only a failed open aborts the run. Write and read failures are logged
  /// and show up as errors and a lower `found`.
  /// 只有打开失败会中止运行。读写失败记录日志，体现为错误计数和更低的 `found`。
  pub fn run<E: Engine>(&mut self, conf: &RunConfig) -> Result<RunResult> {
    let keys = self
      .keygen
      .key_set(conf.key_count, conf.duplicate_ratio);

    let mem = MemBaseline::record();
    let mut engine = E::open(&conf.path, &conf.engine())?;

    let write = write_phase(&mut engine, conf.write_path, &keys)?;
    if conf.flush {
      if let Err(e) = engine.sync() {
        error!("flush before read {:?}: {e}", conf.path);
      }
    }
    let read = read_phase(&mut engine, conf.read_path, conf.read_batch, keys.keys())?;

    if let Err(e) = engine.sync() {
      error!("sync {:?}: {e}", conf.path);
    }
    let disk_bytes = engine.disk_usage();
    let mem_bytes = mem.growth();
    let name = engine.name().to_owned();
    engine.close();

    let result = RunResult::new(
      conf,
      &name,
      write.metrics(keys.len()),
      read.metrics(keys.len()),
      read.found,
      disk_bytes,
      mem_bytes,
    );
    info!(
      "{name} size={} write {:.0} ops/s, read {:.0} ops/s, found {}",
      result.size, result.write.throughput, result.read.throughput, result.found
    );
    Ok(result)
  }
}

/// Timed write through the chosen ingestion path. Bulk ingest includes its
/// sort so every path is timed from keys in memory to engine call returned.
/// 按所选方式计时写入。批量导入包含排序耗时，各方式均从 key 在内存中计时到引擎调用返回。
fn write_phase<E: Engine>(engine: &mut E, path: WritePath, keys: &KeySet) -> Result<Phase> {
  let mut hist = LatencyHistogram::new()?;
  let mut errors = 0u64;
  let count = keys.len();

  let start = Instant::now();
  match path {
    WritePath::SinglePut => {
      for key in keys.keys() {
        let t = Instant::now();
        let r = engine.put(key, VALUE);
        hist.record(t.elapsed());
        if let Err(e) = r {
          if errors == 0 {
            error!("{e} (run of {count} keys)");
          }
          errors += 1;
        }
      }
      if errors > 1 {
        error!("{path}: {errors} of {count} keys failed to write");
      }
    }
    WritePath::Batched => {
      if count > 0 {
        let r = engine.batch_put(keys.keys(), VALUE);
        hist.record(start.elapsed());
        if let Err(e) = r {
          error!("{e}");
          errors = count as u64;
        }
      }
    }
    WritePath::BulkIngest => {
      let sorted = keys.sorted_unique();
      let t = Instant::now();
      let r = engine.bulk_ingest(&sorted, VALUE);
      hist.record(t.elapsed());
      if let Err(e) = r {
        error!("{e}");
        errors = count as u64;
      }
    }
  }
  let duration = start.elapsed();

  Ok(Phase {
    duration: if count == 0 { Duration::ZERO } else { duration },
    hist,
    errors,
    found: 0,
  })
}

/// Timed re-query of every key, duplicates included
/// 计时重查每个 key（包含重复）
fn read_phase<E: Engine>(
  engine: &mut E,
  path: ReadPath,
  batch: usize,
  keys: &[Key],
) -> Result<Phase> {
  let mut hist = LatencyHistogram::new()?;
  let mut errors = 0u64;
  let mut found = 0u64;
  let mut first_err = None;

  let start = Instant::now();
  match path {
    ReadPath::PointGet => {
      for key in keys {
        let t = Instant::now();
        let r = engine.get(key);
        hist.record(t.elapsed());
        match r {
          Ok(true) => found += 1,
          Ok(false) => {}
          Err(e) => {
            errors += 1;
            first_err.get_or_insert(e);
          }
        }
      }
    }
    ReadPath::BatchedGet => {
      for chunk in keys.chunks(batch.max(1)) {
        let t = Instant::now();
        let li = engine.batch_get(chunk);
        hist.record(t.elapsed());
        for r in li {
          match r {
            Ok(true) => found += 1,
            Ok(false) => {}
            Err(e) => {
              errors += 1;
              first_err.get_or_insert(e);
            }
          }
        }
      }
    }
  }
  let duration = start.elapsed();

  if let Some(e) = first_err {
    error!("{path}: {errors} of {} keys failed, first: {e}", keys.len());
  }
  Ok(Phase {
    duration: if keys.is_empty() {
      Duration::ZERO
    } else {
      duration
    },
    hist,
    errors,
    found,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Error, MemAdapter};

  #[test]
  fn test_open_error_no_result() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("file");
    std::fs::write(&file, b"x").unwrap();
    let r = Runner::with_seed(1).run::<MemAdapter>(&RunConfig::new(10, &file));
    assert!(matches!(r, Err(Error::Open { .. })));
  }

  #[test]
  fn test_zero_keys() {
    let dir = tempfile::tempdir().unwrap();
    for write in [WritePath::SinglePut, WritePath::Batched, WritePath::BulkIngest] {
      let conf = RunConfig::new(0, dir.path().join("db")).write_path(write);
      let r = Runner::with_seed(1).run::<MemAdapter>(&conf).unwrap();
      assert_eq!(r.found, 0);
      assert_eq!(r.write.duration_ns, 0);
      assert!(r.read.throughput.is_nan());
      assert!(r.write.latency.is_nan());
    }
  }
}
