// Runner, sweep and report tests on the in-memory engine
// 基于内存引擎的运行器、扫描和报告测试

use std::{fs, path::Path, time::Duration};

use aok::{OK, Void};
use hash_keys::Key;
use log::info;
use proptest::prelude::*;
use rocks_sweep::{
  Axes, CSV_HEADER, CsvSink, Engine, EngineConf, Error, LatencyHistogram, MemAdapter, ReadPath,
  Result, RunConfig, Runner, Sweep, WritePath, summary, write_csv,
};

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

const WRITES: [WritePath; 3] = [WritePath::SinglePut, WritePath::Batched, WritePath::BulkIngest];
const READS: [ReadPath; 2] = [ReadPath::PointGet, ReadPath::BatchedGet];

#[test]
fn round_trip_every_path() -> Void {
  let dir = tempfile::tempdir()?;
  let mut runner = Runner::with_seed(42);
  for write in WRITES {
    for read in READS {
      for dup in [0.0, 0.5] {
        let conf = RunConfig::new(1000, dir.path().join("db"))
          .duplicate_ratio(dup)
          .read_batch(64)
          .write_path(write)
          .read_path(read);
        let r = runner.run::<MemAdapter>(&conf)?;
        info!("{write} {read} dup={dup}: found {}", r.found);
        assert_eq!(r.found, 1000);
        assert_eq!(r.write.errors, 0);
        assert_eq!(r.read.errors, 0);
        assert_eq!(r.read.ops, 1000);
        assert!(r.write.throughput > 0.0);
      }
    }
  }
  OK
}

#[test]
fn read_batch_larger_than_keys() -> Void {
  let dir = tempfile::tempdir()?;
  let mut found = Vec::new();
  for batch in [1, 999, 1000, 5000] {
    let conf = RunConfig::new(1000, dir.path().join("db"))
      .duplicate_ratio(0.3)
      .read_batch(batch)
      .read_path(ReadPath::BatchedGet);
    let r = Runner::with_seed(7).run::<MemAdapter>(&conf)?;
    found.push(r.found);
  }
  assert!(found.iter().all(|&f| f == 1000));
  OK
}

#[test]
fn read_calls_follow_batch_size() -> Void {
  let dir = tempfile::tempdir()?;
  let conf = RunConfig::new(1000, dir.path().join("db"))
    .read_batch(300)
    .read_path(ReadPath::BatchedGet);
  let r = Runner::with_seed(7).run::<MemAdapter>(&conf)?;
  // 300 + 300 + 300 + 100
  assert_eq!(r.read.calls.count, 4);
  OK
}

/// Every `PUT`th put and every `GET`th lookup fails; batch writes always fail
/// 每第 `PUT` 次 put 与每第 `GET` 次查询失败；批量写入总是失败
struct FailEvery<const PUT: usize, const GET: usize> {
  inner: MemAdapter,
  puts: usize,
  gets: usize,
}

impl<const PUT: usize, const GET: usize> FailEvery<PUT, GET> {
  fn lookup(&mut self, key: &Key) -> Result<bool> {
    let n = self.gets;
    self.gets += 1;
    if n % GET == GET - 1 {
      return Err(Error::Read {
        op: "get",
        count: 1,
        msg: format!("injected failure #{n}"),
      });
    }
    self.inner.get(key)
  }
}

impl<const PUT: usize, const GET: usize> Engine for FailEvery<PUT, GET> {
  fn open(path: &Path, conf: &EngineConf) -> Result<Self> {
    Ok(Self {
      inner: MemAdapter::open(path, conf)?,
      puts: 0,
      gets: 0,
    })
  }

  fn name(&self) -> &str {
    "fail-every"
  }

  fn data_path(&self) -> &Path {
    self.inner.data_path()
  }

  fn put(&mut self, key: &Key, val: &[u8]) -> Result<()> {
    let n = self.puts;
    self.puts += 1;
    if n % PUT == PUT - 1 {
      return Err(Error::Write {
        op: "put",
        count: 1,
        msg: format!("injected failure #{n}"),
      });
    }
    self.inner.put(key, val)
  }

  fn batch_put(&mut self, keys: &[Key], _val: &[u8]) -> Result<()> {
    Err(Error::Write {
      op: "batch put",
      count: keys.len(),
      msg: "injected failure".into(),
    })
  }

  fn bulk_ingest(&mut self, keys: &[Key], _val: &[u8]) -> Result<()> {
    Err(Error::Ingest {
      file: self.inner.data_path().join("ingest.sst"),
      count: keys.len(),
      msg: "injected failure".into(),
    })
  }

  fn get(&mut self, key: &Key) -> Result<bool> {
    self.lookup(key)
  }

  fn batch_get(&mut self, keys: &[Key]) -> Vec<Result<bool>> {
    keys.iter().map(|k| self.lookup(k)).collect()
  }

  fn sync(&mut self) -> Result<()> {
    self.inner.sync()
  }
}

#[test]
fn failed_ops_are_counted_not_fatal() -> Void {
  let dir = tempfile::tempdir()?;
  // key i lost on write when i % 10 == 9, lookup i fails when i % 4 == 3
  let expect_found = (0..1000).filter(|i| i % 10 != 9 && i % 4 != 3).count();
  assert_eq!(expect_found, 700);

  for read in READS {
    let conf = RunConfig::new(1000, dir.path().join("db"))
      .read_batch(64)
      .write_path(WritePath::SinglePut)
      .read_path(read);
    let r = Runner::with_seed(11).run::<FailEvery<10, 4>>(&conf)?;
    assert_eq!(r.engine, "fail-every");
    assert_eq!(r.write.errors, 100, "{read}");
    assert_eq!(r.read.errors, 250, "{read}");
    assert_eq!(r.found, expect_found as u64, "{read}");
    assert_eq!(r.write.ops, 1000);
    assert_eq!(r.read.ops, 1000);
  }
  OK
}

#[test]
fn failed_batch_counts_every_key() -> Void {
  let dir = tempfile::tempdir()?;
  for write in [WritePath::Batched, WritePath::BulkIngest] {
    let conf = RunConfig::new(1000, dir.path().join("db"))
      .duplicate_ratio(0.5)
      .write_path(write);
    // lookups never fail here / 此处查询不会失败
    let r = Runner::with_seed(11).run::<FailEvery<1, { usize::MAX }>>(&conf)?;
    assert_eq!(r.write.errors, 1000, "{write}");
    assert_eq!(r.read.errors, 0, "{write}");
    assert_eq!(r.found, 0, "{write}");
  }
  OK
}

#[test]
fn flush_before_read() -> Void {
  let dir = tempfile::tempdir()?;
  for write in WRITES {
    let conf = RunConfig::new(500, dir.path().join("db"))
      .write_path(write)
      .flush(true);
    let r = Runner::with_seed(13).run::<MemAdapter>(&conf)?;
    assert_eq!(r.found, 500, "{write}");
    assert_eq!(r.write.errors + r.read.errors, 0);
  }
  OK
}

#[test]
fn sweep_skips_failed_open() -> Void {
  let dir = tempfile::tempdir()?;
  let blocked = dir.path().join("blocked");
  fs::write(&blocked, b"not a directory")?;

  let axes = Axes {
    sizes: vec![10, 20],
    ..Axes::default()
  };
  let mut configs = axes.configs(&dir.path().join("db"));
  configs.insert(1, RunConfig::new(5, &blocked));

  let mut rows = 0;
  let out = Sweep::run::<MemAdapter, _>(&mut Runner::with_seed(1), &configs, |_| {
    rows += 1;
    Ok(())
  })?;
  assert_eq!(rows, 2);
  assert_eq!(out.failed, 1);
  assert_eq!(out.open_failed, 1);
  assert!(!out.no_engine());
  assert_eq!(out.keys(), 30);
  assert_eq!(
    out.results.iter().map(|r| r.size).collect::<Vec<_>>(),
    [10, 20]
  );

  let out = Sweep::run::<MemAdapter, _>(&mut Runner::new(), &configs[1..2], |_| Ok(()))?;
  assert!(out.no_engine());
  OK
}

#[test]
fn sweep_stops_on_sink_error() -> Void {
  let dir = tempfile::tempdir()?;
  let configs = Axes {
    sizes: vec![1, 2, 3],
    ..Axes::default()
  }
  .configs(&dir.path().join("db"));
  let r = Sweep::run::<MemAdapter, _>(&mut Runner::new(), &configs, |_| {
    Err(Error::Output {
      path: "results.csv".into(),
      source: std::io::Error::other("disk full"),
    })
  });
  assert!(matches!(r, Err(Error::Output { .. })));
  OK
}

#[test]
fn csv_header_once() -> Void {
  let dir = tempfile::tempdir()?;
  let csv = dir.path().join("results.csv");

  // header even with zero runs / 即使没有运行也写表头
  CsvSink::open(&csv)?;
  assert_eq!(fs::read_to_string(&csv)?, format!("{CSV_HEADER}\n"));

  let conf = RunConfig::new(100, dir.path().join("db"));
  let r = Runner::with_seed(3).run::<MemAdapter>(&conf)?;
  write_csv(&csv, std::slice::from_ref(&r))?;
  write_csv(&csv, &[r.clone(), r])?;

  let text = fs::read_to_string(&csv)?;
  let lines: Vec<_> = text.lines().collect();
  assert_eq!(lines.len(), 4);
  assert_eq!(lines.iter().filter(|l| **l == CSV_HEADER).count(), 1);
  let cols: Vec<_> = lines[1].split(',').collect();
  assert_eq!(cols.len(), CSV_HEADER.split(',').count());
  assert_eq!(&cols[..6], ["100", "0", "off", "leveled", "block-based", "1"]);
  assert_eq!(cols[12], "100");
  OK
}

#[test]
fn csv_zero_keys_nan() -> Void {
  let dir = tempfile::tempdir()?;
  let csv = dir.path().join("results.csv");
  let r = Runner::with_seed(3).run::<MemAdapter>(&RunConfig::new(0, dir.path().join("db")))?;
  write_csv(&csv, &[r])?;
  let text = fs::read_to_string(&csv)?;
  let row: Vec<_> = text.lines().nth(1).unwrap_or_default().split(',').collect();
  assert_eq!(row[8], "NaN");
  assert_eq!(row[12], "0");
  OK
}

#[test]
fn csv_unwritable_is_output_error() -> Void {
  let dir = tempfile::tempdir()?;
  let r = CsvSink::open(dir.path().join("missing").join("results.csv"));
  assert!(matches!(r, Err(Error::Output { .. })));
  OK
}

#[test]
fn summary_has_every_run() -> Void {
  let dir = tempfile::tempdir()?;
  let configs = Axes {
    sizes: vec![10, 20, 30],
    ..Axes::default()
  }
  .configs(&dir.path().join("db"));
  let out = Sweep::run::<MemAdapter, _>(&mut Runner::new(), &configs, |_| Ok(()))?;
  let table = summary(&out.results);
  info!("\n{table}");
  // 3 rules + header + 3 rows
  assert_eq!(table.lines().count(), 7);
  OK
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(100))]

  /// min <= p50 <= p99 <= p999 <= max, mean within [min, max]
  #[test]
  fn prop_latency_ordering(
    latencies in prop::collection::vec(0u64..1_000_000_000u64, 1..500)
  ) {
    let mut hist = LatencyHistogram::new().expect("create histogram");
    for &ns in &latencies {
      hist.record(Duration::from_nanos(ns));
    }
    let s = hist.stats();
    prop_assert_eq!(s.count, latencies.len() as u64);
    prop_assert!(s.min >= 1, "zero is clamped to 1ns");
    prop_assert!(s.min <= s.p50 && s.p50 <= s.p99 && s.p99 <= s.p999 && s.p999 <= s.max);
    prop_assert!(s.mean >= s.min as f64 && s.mean <= s.max as f64);
  }
}
