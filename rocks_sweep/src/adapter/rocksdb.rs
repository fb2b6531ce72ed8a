// RocksDB adapter / RocksDB 适配器

use std::path::{Path, PathBuf};

use hash_keys::{KEY_LEN, Key};
use log::{debug, warn};
use rocksdb::{
  BlockBasedOptions, Cache, CuckooTableOptions, DB, DBCompactionStyle, DBCompressionType,
  KeyEncodingType, Options, PlainTableFactoryOptions, SliceTransform, SstFileWriter, WriteBatch,
};

use crate::{BLOOM_BITS_PER_KEY, Compaction, Engine, EngineConf, Error, Result, TableFormat};

const ENGINE_NAME: &str = "rocksdb";
/// 8MB cache / 8MB 缓存
const CACHE_SIZE: usize = 8 * 1024 * 1024;
/// Fixed prefix for plain table hash index / plain 表哈希索引的定长前缀
const PLAIN_PREFIX_LEN: usize = 8;
const INGEST_SUFFIX: &str = "ingest.sst";

/// Translate run conf into RocksDB options
/// 将运行配置转换为 RocksDB 选项
pub fn options(conf: &EngineConf) -> Options {
  let mut opts = Options::default();
  opts.create_if_missing(true);
  opts.set_compression_type(DBCompressionType::None);
  let cores = std::thread::available_parallelism()
    .map(|n| n.get() as i32)
    .unwrap_or(4);
  opts.increase_parallelism(cores);

  opts.set_compaction_style(match conf.compaction {
    Compaction::Leveled => DBCompactionStyle::Level,
    Compaction::Universal => DBCompactionStyle::Universal,
  });

  let bloom = conf.bloom.enabled();
  match conf.format {
    TableFormat::BlockBased => {
      let cache = Cache::new_lru_cache(CACHE_SIZE);
      let mut block_opts = BlockBasedOptions::default();
      block_opts.set_block_cache(&cache);
      if bloom {
        block_opts.set_bloom_filter(BLOOM_BITS_PER_KEY as f64, false);
      }
      opts.set_block_based_table_factory(&block_opts);
    }
    TableFormat::Plain => {
      // plain table needs mmap reads and a prefix extractor
      // plain 表需要 mmap 读取和前缀提取器
      opts.set_allow_mmap_reads(true);
      opts.set_prefix_extractor(SliceTransform::create_fixed_prefix(PLAIN_PREFIX_LEN));
      opts.set_plain_table_factory(&PlainTableFactoryOptions {
        user_key_length: KEY_LEN as u32,
        bloom_bits_per_key: if bloom { BLOOM_BITS_PER_KEY as i32 } else { 0 },
        hash_table_ratio: 0.75,
        index_sparseness: 16,
        huge_page_tlb_size: 0,
        encoding_type: KeyEncodingType::Plain,
        full_scan_mode: false,
        store_index_in_file: false,
      });
    }
    TableFormat::Cuckoo => {
      // cuckoo table has no bloom filter
      // cuckoo 表没有布隆过滤器
      opts.set_allow_mmap_reads(true);
      opts.set_cuckoo_table_factory(&CuckooTableOptions::default());
    }
  }
  opts
}

/// RocksDB adapter / RocksDB 适配器
pub struct RocksDbAdapter {
  db: DB,
  opts: Options,
  /// Data directory / 数据目录
  path: PathBuf,
}

/// SST file built for bulk ingest: `<dir>.ingest.sst` next to the data
/// directory, never inside it. Paths without a name (`.`, `/`) are resolved
/// first, the temp dir is the last resort.
/// 批量导入用的 SST 文件：位于数据目录旁而非目录内。无名路径先解析，最后退回临时目录。
pub fn ingest_path(path: &Path) -> PathBuf {
  let dir = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
  match (dir.parent(), dir.file_name()) {
    (Some(parent), Some(name)) => {
      let mut name = name.to_os_string();
      name.push(".");
      name.push(INGEST_SUFFIX);
      parent.join(name)
    }
    _ => std::env::temp_dir().join(format!("rocks_sweep.{}.{INGEST_SUFFIX}", std::process::id())),
  }
}

impl RocksDbAdapter {

  fn build_sst(&self, file: &Path, keys: &[Key], val: &[u8]) -> Result<(), rocksdb::Error> {
    let mut writer = SstFileWriter::create(&self.opts);
    writer.open(file)?;
    for key in keys {
      writer.put(key, val)?;
    }
    writer.finish()
  }
}

impl Engine for RocksDbAdapter {
  fn open(path: &Path, conf: &EngineConf) -> Result<Self> {
    let opts = options(conf);
    let open_err = |e: rocksdb::Error| Error::Open {
      path: path.to_path_buf(),
      msg: e.into_string(),
    };
    // clear previous run, open reports an unusable path
    // 清除上次运行数据，路径不可用时由 open 报错
    if let Err(e) = DB::destroy(&opts, path) {
      warn!("rocksdb destroy {path:?}: {e}");
    }
    let db = DB::open(&opts, path).map_err(open_err)?;
    debug!("rocksdb opened: {path:?} {conf:?}");
    Ok(Self {
      db,
      opts,
      path: path.to_path_buf(),
    })
  }

  fn name(&self) -> &str {
    ENGINE_NAME
  }

  fn data_path(&self) -> &Path {
    &self.path
  }

  fn put(&mut self, key: &Key, val: &[u8]) -> Result<()> {
    self.db.put(key, val).map_err(|e| Error::Write {
      op: "put",
      count: 1,
      msg: e.into_string(),
    })
  }

  fn batch_put(&mut self, keys: &[Key], val: &[u8]) -> Result<()> {
    let mut batch = WriteBatch::default();
    for key in keys {
      batch.put(key, val);
    }
    self.db.write(batch).map_err(|e| Error::Write {
      op: "write batch",
      count: keys.len(),
      msg: e.into_string(),
    })
  }

  fn bulk_ingest(&mut self, keys: &[Key], val: &[u8]) -> Result<()> {
    // an sst file cannot be empty / sst 文件不能为空
    if keys.is_empty() {
      return Ok(());
    }
    let file = ingest_path(&self.path);
    let r = self
      .build_sst(&file, keys, val)
      .and_then(|_| self.db.ingest_external_file(vec![&file]));
    let _ = std::fs::remove_file(&file);
    r.map_err(|e| Error::Ingest {
      file,
      count: keys.len(),
      msg: e.into_string(),
    })
  }

  fn get(&mut self, key: &Key) -> Result<bool> {
    match self.db.get_pinned(key) {
      Ok(v) => Ok(v.is_some()),
      Err(e) => Err(Error::Read {
        op: "get",
        count: 1,
        msg: e.into_string(),
      }),
    }
  }

  fn batch_get(&mut self, keys: &[Key]) -> Vec<Result<bool>> {
    self
      .db
      .multi_get(keys)
      .into_iter()
      .map(|r| {
        r.map(|v| v.is_some()).map_err(|e| Error::Read {
          op: "multi get",
          count: keys.len(),
          msg: e.into_string(),
        })
      })
      .collect()
  }

  fn sync(&mut self) -> Result<()> {
    self.db.flush()?;
    // fsync WAL / 同步 WAL 到磁盘
    self.db.flush_wal(true)?;
    Ok(())
  }
}

impl Drop for RocksDbAdapter {
  fn drop(&mut self) {
    debug!("rocksdb closed: {:?}", self.path);
  }
}
