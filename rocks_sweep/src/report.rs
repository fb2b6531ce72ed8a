// CSV sink, console summary and JSON report
// CSV 输出、控制台汇总与 JSON 报告

use std::{
  fmt::Write as _,
  fs::{File, OpenOptions},
  io::Write,
  path::{Path, PathBuf},
};

use humansize::{BINARY, format_size};

use crate::{Error, Result, RunResult};

pub const CSV_HEADER: &str = "size,duplicates,bloom,compaction,format,read_batch,write_time,read_time,write_throughput,read_throughput,write_latency,read_latency,found";

const RULE: &str =
  "------------------------------------------------------------------------------------------------------";

/// Append-only results file / 只追加的结果文件
pub struct CsvSink {
  file: File,
  path: PathBuf,
}

impl CsvSink {
  /// Open in append mode, header written at once if the file is empty
  /// 以追加模式打开，文件为空时立即写入表头
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let out = |source| Error::Output {
      path: path.clone(),
      source,
    };
    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .map_err(out)?;
    if file.metadata().map_err(out)?.len() == 0 {
      writeln!(file, "{CSV_HEADER}").map_err(out)?;
      file.flush().map_err(out)?;
    }
    Ok(Self { file, path })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Append one row and flush / 追加一行并刷新
  pub fn append(&mut self, r: &RunResult) -> Result<()> {
    let line = csv_row(r);
    self
      .file
      .write_all(line.as_bytes())
      .and_then(|_| self.file.flush())
      .map_err(|source| Error::Output {
        path: self.path.clone(),
        source,
      })
  }
}

/// One CSV line, times in seconds / 一行 CSV，时间单位为秒
pub fn csv_row(r: &RunResult) -> String {
  format!(
    "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
    r.size,
    r.duplicates,
    r.bloom,
    r.compaction,
    r.format,
    r.read_batch,
    r.write.secs(),
    r.read.secs(),
    r.write.throughput,
    r.read.throughput,
    r.write.latency,
    r.read.latency,
    r.found
  )
}

/// Open + append every result / 打开并追加所有结果
pub fn write_csv(path: impl Into<PathBuf>, results: &[RunResult]) -> Result<()> {
  let mut sink = CsvSink::open(path)?;
  for r in results {
    sink.append(r)?;
  }
  Ok(())
}

/// Aligned summary table / 对齐的汇总表
pub fn summary(results: &[RunResult]) -> String {
  let mut s = String::new();
  let _ = writeln!(s, "{RULE}");
  let _ = writeln!(
    s,
    "{:>9} | {:>5} | {:>5} | {:>10} | {:>11} | {:>11} | {:>11} | {:>8} | {:>9} | {:>10} | {:>10}",
    "Size", "Dup", "Bloom", "Compaction", "Format", "Write", "Read", "W(s)", "R(s)", "Found", "Disk"
  );
  let _ = writeln!(s, "{RULE}");
  for r in results {
    let _ = writeln!(
      s,
      "{:>9} | {:>5.2} | {:>5} | {:>10} | {:>11} | {:>11} | {:>11} | {:>8.3} | {:>9.3} | {:>10} | {:>10}",
      r.size,
      r.duplicates,
      r.bloom.as_str(),
      r.compaction.as_str(),
      r.format.as_str(),
      r.write_path.as_str(),
      r.read_path.as_str(),
      r.write.secs(),
      r.read.secs(),
      r.found,
      format_size(r.disk_bytes, BINARY),
    );
  }
  let _ = writeln!(s, "{RULE}");
  s
}

pub fn print_summary(results: &[RunResult]) {
  print!("{}", summary(results));
}

/// Pretty JSON of all results / 所有结果的格式化 JSON
pub fn write_json(path: &Path, results: &[RunResult]) -> Result<()> {
  let json = sonic_rs::to_string_pretty(results)?;
  std::fs::write(path, json).map_err(|source| Error::Output {
    path: path.to_path_buf(),
    source,
  })
}
