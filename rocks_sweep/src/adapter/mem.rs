// In-memory adapter / 内存适配器
//
// BTreeMap engine that writes a flat snapshot on sync. Exercises the runner
// and sweep without a native engine build.
// 基于 BTreeMap 的引擎，sync 时写出快照。无需原生引擎即可驱动运行器和扫描。

use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
};

use hash_keys::Key;
use log::debug;

use crate::{Engine, EngineConf, Error, Result};

const ENGINE_NAME: &str = "mem";
const SNAPSHOT: &str = "mem.dat";

#[derive(Debug)]
pub struct MemAdapter {
  map: BTreeMap<Key, Vec<u8>>,
  path: PathBuf,
}

impl MemAdapter {
  /// Stored key count / 已存储 key 数
  pub fn len(&self) -> usize {
    self.map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }
}

impl Engine for MemAdapter {
  fn open(path: &Path, conf: &EngineConf) -> Result<Self> {
    let open_err = |e: std::io::Error| Error::Open {
      path: path.to_path_buf(),
      msg: e.to_string(),
    };
    if path.is_dir() {
      fs::remove_dir_all(path).map_err(open_err)?;
    }
    fs::create_dir_all(path).map_err(open_err)?;
    debug!("mem opened: {path:?} {conf:?}");
    Ok(Self {
      map: BTreeMap::new(),
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
    self.map.insert(*key, val.to_vec());
    Ok(())
  }

  fn batch_put(&mut self, keys: &[Key], val: &[u8]) -> Result<()> {
    for key in keys {
      self.map.insert(*key, val.to_vec());
    }
    Ok(())
  }

  fn bulk_ingest(&mut self, keys: &[Key], val: &[u8]) -> Result<()> {
    if !keys.windows(2).all(|w| w[0] < w[1]) {
      return Err(Error::Ingest {
        file: self.path.join(SNAPSHOT),
        count: keys.len(),
        msg: "keys must be sorted and distinct".into(),
      });
    }
    self.batch_put(keys, val)
  }

  fn get(&mut self, key: &Key) -> Result<bool> {
    Ok(self.map.contains_key(key))
  }

  fn batch_get(&mut self, keys: &[Key]) -> Vec<Result<bool>> {
    keys.iter().map(|k| Ok(self.map.contains_key(k))).collect()
  }

  fn sync(&mut self) -> Result<()> {
    let mut buf = Vec::new();
    for (k, v) in &self.map {
      buf.extend_from_slice(k);
      buf.extend_from_slice(v);
    }
    fs::write(self.path.join(SNAPSHOT), buf)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_open_clears() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db");
    let conf = EngineConf::default();

    let mut db = MemAdapter::open(&path, &conf).unwrap();
    db.put(&[1; 16], b"1").unwrap();
    db.sync().unwrap();
    assert!(db.disk_usage() > 0);
    db.close();

    let db = MemAdapter::open(&path, &conf).unwrap();
    assert!(db.is_empty());
    assert_eq!(db.disk_usage(), 0);
  }

  #[test]
  fn test_unsorted_ingest() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = MemAdapter::open(dir.path(), &EngineConf::default()).unwrap();
    let r = db.bulk_ingest(&[[2; 16], [1; 16]], b"1");
    assert!(matches!(r, Err(Error::Ingest { .. })));
  }
}
