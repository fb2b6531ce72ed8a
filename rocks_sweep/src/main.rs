// rocks_sweep: time RocksDB write and read paths over a configuration sweep
// rocks_sweep：在配置扫描下测量 RocksDB 读写耗时

use std::path::PathBuf;

use aok::{OK, Void};
use clap::Parser;
use log::info;
use rocks_sweep::{
  Axes, Bloom, Compaction, CsvSink, Error, ReadPath, RocksDbAdapter, Runner, Sweep, TableFormat,
  WritePath, print_summary, write_json,
};

/// Axis flags take one value or a comma separated list
/// 轴参数接受单个值或逗号分隔的列表
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
  /// Key count / key 数量
  #[arg(long, value_delimiter = ',', default_value = "100000")]
  size: Vec<usize>,

  /// Duplicate ratio in [0, 1] / 重复率
  #[arg(long, value_delimiter = ',', default_value = "0", value_parser = parse_ratio)]
  duplicates: Vec<f64>,

  #[arg(long, value_enum, value_delimiter = ',', default_value = "off")]
  bloom: Vec<Bloom>,

  #[arg(long, value_enum, value_delimiter = ',', default_value = "leveled")]
  compaction: Vec<Compaction>,

  #[arg(long, value_enum, value_delimiter = ',', default_value = "block-based")]
  format: Vec<TableFormat>,

  /// Keys per multi-get / 每次 multi-get 的 key 数
  #[arg(long = "read_batch", value_delimiter = ',', default_value = "100", value_parser = parse_batch)]
  read_batch: Vec<usize>,

  /// Ingestion path / 写入方式
  #[arg(long, value_enum, value_delimiter = ',', default_value = "batched")]
  write: Vec<WritePath>,

  /// Lookup path / 读取方式
  #[arg(long, value_enum, value_delimiter = ',', default_value = "point-get")]
  read: Vec<ReadPath>,

  /// Flush between write and read so reads hit SST files
  /// 写读之间刷盘，使读取命中 SST 文件
  #[arg(long)]
  flush: bool,

  /// Database directory, wiped before every run / 数据库目录，每次运行前清空
  #[arg(long, default_value = "testdb")]
  path: PathBuf,

  #[arg(long, default_value = "results.csv")]
  csv: PathBuf,

  /// Also dump results as JSON / 额外输出 JSON
  #[arg(long)]
  json: Option<PathBuf>,

  /// Key generator seed / key 生成器种子
  #[arg(long)]
  seed: Option<u64>,
}

fn parse_ratio(s: &str) -> Result<f64, String> {
  let v: f64 = s.parse().map_err(|e| format!("{s}: {e}"))?;
  if (0.0..=1.0).contains(&v) {
    Ok(v)
  } else {
    Err(format!("{v} not in [0, 1]"))
  }
}

fn parse_batch(s: &str) -> Result<usize, String> {
  match s.parse::<usize>() {
    Ok(0) => Err("read batch must be at least 1".into()),
    Ok(n) => Ok(n),
    Err(e) => Err(format!("{s}: {e}")),
  }
}

impl Args {
  fn axes(&self) -> Axes {
    Axes {
      sizes: self.size.clone(),
      duplicates: self.duplicates.clone(),
      blooms: self.bloom.clone(),
      compactions: self.compaction.clone(),
      formats: self.format.clone(),
      read_batches: self.read_batch.clone(),
      write_paths: self.write.clone(),
      read_paths: self.read.clone(),
      flush: self.flush,
    }
  }
}

fn main() -> Void {
  log_init::init();
  let args = Args::parse();

  // results file first, losing benchmark data is not an option
  // 先打开结果文件，不允许丢失基准数据
  let mut sink = CsvSink::open(&args.csv)?;

  let axes = args.axes();
  let configs = axes.configs(&args.path);
  info!("{} runs, results to {:?}", configs.len(), sink.path());

  let mut runner = match args.seed {
    Some(seed) => Runner::with_seed(seed),
    None => Runner::new(),
  };
  let out = Sweep::run::<RocksDbAdapter, _>(&mut runner, &configs, |r| sink.append(r))?;

  println!();
  print_summary(&out.results);
  println!("Saved results to {}", sink.path().display());
  if let Some(json) = &args.json {
    write_json(json, &out.results)?;
    println!("Saved JSON to {}", json.display());
  }
  if out.failed > 0 {
    println!("{} of {} runs failed, see log", out.failed, configs.len());
  }
  println!("Processed {} keys", out.keys());

  if out.no_engine() {
    return Err(Error::NoEngine(out.open_failed).into());
  }
  OK
}
