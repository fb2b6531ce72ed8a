// Sweep controller over the configuration axes
// 配置轴的扫描控制器

use std::path::Path;

use log::error;
use serde::{Deserialize, Serialize};

use crate::{
  Bloom, Compaction, Engine, Error, ReadPath, Result, RunConfig, RunResult, Runner, TableFormat,
  WritePath,
};

/// Values of every swept axis
/// 每个扫描轴的取值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Axes {
  pub sizes: Vec<usize>,
  pub duplicates: Vec<f64>,
  pub blooms: Vec<Bloom>,
  pub compactions: Vec<Compaction>,
  pub formats: Vec<TableFormat>,
  pub read_batches: Vec<usize>,
  pub write_paths: Vec<WritePath>,
  pub read_paths: Vec<ReadPath>,
  /// Not an axis, applies to every run / 非扫描轴，作用于每次运行
  pub flush: bool,
}

impl Default for Axes {
  fn default() -> Self {
    Self {
      sizes: vec![100_000],
      duplicates: vec![0.0],
      blooms: vec![Bloom::Off],
      compactions: vec![Compaction::Leveled],
      formats: vec![TableFormat::BlockBased],
      read_batches: vec![100],
      write_paths: vec![WritePath::Batched],
      read_paths: vec![ReadPath::PointGet],
      flush: false,
    }
  }
}

impl Axes {
  /// Number of combinations / 组合数
  pub fn len(&self) -> usize {
    self.sizes.len()
      * self.duplicates.len()
      * self.blooms.len()
      * self.compactions.len()
      * self.formats.len()
      * self.read_batches.len()
      * self.write_paths.len()
      * self.read_paths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Cartesian product, outer to inner: size, duplicates, bloom, compaction,
  /// format, read batch, write path, read path
  /// 笛卡尔积，由外到内：数量、重复率、布隆、压实、格式、读批次、写方式、读方式
  pub fn configs(&self, path: &Path) -> Vec<RunConfig> {
    let mut li = Vec::with_capacity(self.len());
    for &size in &self.sizes {
      for &dup in &self.duplicates {
        for &bloom in &self.blooms {
          for &compaction in &self.compactions {
            for &format in &self.formats {
              for &read_batch in &self.read_batches {
                for &write_path in &self.write_paths {
                  for &read_path in &self.read_paths {
                    li.push(RunConfig {
                      key_count: size,
                      duplicate_ratio: dup,
                      bloom,
                      compaction,
                      format,
                      read_batch: read_batch.max(1),
                      write_path,
                      read_path,
                      flush: self.flush,
                      path: path.to_path_buf(),
                    });
                  }
                }
              }
            }
          }
        }
      }
    }
    li
  }
}

/// What a sweep produced / 扫描产出
#[derive(Debug, Default)]
pub struct SweepOutcome {
  /// Completed runs, generation order / 已完成的运行，按生成顺序
  pub results: Vec<RunResult>,
  /// Runs skipped after an error / 出错跳过的运行数
  pub failed: usize,
  /// Of those, failed to open the engine / 其中打开引擎失败的数量
  pub open_failed: usize,
}

impl SweepOutcome {
  /// Every attempted run failed at open / 所有尝试的运行都打开失败
  pub fn no_engine(&self) -> bool {
    self.results.is_empty() && self.open_failed > 0 && self.open_failed == self.failed
  }

  /// Keys processed by completed runs / 已完成运行处理的 key 数
  pub fn keys(&self) -> usize {
    self.results.iter().map(|r| r.size).sum()
  }
}

/// Strictly sequential: one engine alive at a time
/// 严格串行：同一时刻只有一个引擎实例
pub struct Sweep;

impl Sweep {
  /// Run every config. Engine errors skip the run; an error from `on_result`
  /// (the results sink) ends the sweep.
  /// 运行每个配置。引擎错误跳过该次运行；`on_result`（结果输出）出错则终止扫描。
  pub fn run<E, F>(runner: &mut Runner, configs: &[RunConfig], mut on_result: F) -> Result<SweepOutcome>
  where
    E: Engine,
    F: FnMut(&RunResult) -> Result<()>,
  {
    let mut out = SweepOutcome::default();
    for conf in configs {
      println!(
        "\nRunning: size={} dup={} bloom={} compaction={} format={} read_batch={} write={} read={} ...",
        conf.key_count,
        conf.duplicate_ratio,
        conf.bloom,
        conf.compaction,
        conf.format,
        conf.read_batch,
        conf.write_path,
        conf.read_path,
      );
      match runner.run::<E>(conf) {
        Ok(r) => {
          on_result(&r)?;
          out.results.push(r);
        }
        Err(e) if e.is_engine() => {
          error!("run size={} at {:?}: {e}", conf.key_count, conf.path);
          if matches!(e, Error::Open { .. }) {
            out.open_failed += 1;
          }
          out.failed += 1;
        }
        Err(e) => return Err(e),
      }
    }
    Ok(out)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_product_order() {
    let axes = Axes {
      sizes: vec![10, 20],
      duplicates: vec![0.0, 0.5],
      blooms: vec![Bloom::Off, Bloom::On],
      compactions: vec![Compaction::Leveled, Compaction::Universal],
      ..Axes::default()
    };
    let li = axes.configs(Path::new("db"));
    assert_eq!(li.len(), 16);
    assert_eq!(axes.len(), 16);
    assert_eq!(li[0].key_count, 10);
    assert_eq!(li[1].compaction, Compaction::Universal);
    assert_eq!(li[2].bloom, Bloom::On);
    assert_eq!(li[4].duplicate_ratio, 0.5);
    assert_eq!(li[8].key_count, 20);
    assert_eq!(li[15].compaction, Compaction::Universal);
  }

  #[test]
  fn test_empty_axis() {
    let axes = Axes {
      formats: vec![],
      ..Axes::default()
    };
    assert!(axes.is_empty());
    assert!(axes.configs(Path::new("db")).is_empty());
  }
}
