// Key generator for benchmark
// 基准测试的 key 生成器

use crate::KeySet;

/// Key width in bytes / key 字节宽度
pub const KEY_LEN: usize = 16;

/// Fixed-width opaque key / 定长不透明 key
pub type Key = [u8; KEY_LEN];

/// Uniform 128-bit key generator
/// 均匀分布的 128 位 key 生成器
///
/// Owns its rng, so two generators never share state.
/// 自带随机数生成器，生成器之间不共享状态。
#[derive(Debug, Clone)]
pub struct KeyGen {
  rng: fastrand::Rng,
}

impl Default for KeyGen {
  fn default() -> Self {
    Self::new()
  }
}

impl KeyGen {
  /// Seeded from OS entropy / 使用系统熵初始化
  pub fn new() -> Self {
    Self {
      rng: fastrand::Rng::new(),
    }
  }

  /// Deterministic generator / 确定性生成器
  pub fn with_seed(seed: u64) -> Self {
    Self {
      rng: fastrand::Rng::with_seed(seed),
    }
  }

  /// Reset to seed / 重置种子
  pub fn reset(&mut self, seed: u64) {
    self.rng.seed(seed);
  }

  /// Next key: two 64-bit draws, little endian
  /// 下一个 key：两次 64 位采样，小端序
  #[inline]
  pub fn key(&mut self) -> Key {
    let mut key = [0u8; KEY_LEN];
    key[..8].copy_from_slice(&self.rng.u64(..).to_le_bytes());
    key[8..].copy_from_slice(&self.rng.u64(..).to_le_bytes());
    key
  }

  /// Generate `count` keys / 生成 `count` 个 key
  pub fn gen_keys(&mut self, count: usize) -> Vec<Key> {
    (0..count).map(|_| self.key()).collect()
  }

  /// Generate key set with duplicate ratio
  /// 按重复率生成 key 集合
  pub fn key_set(&mut self, count: usize, dup_ratio: f64) -> KeySet {
    let unique = count - crate::dup_count(count, dup_ratio);
    let keys = self.gen_keys(unique);
    KeySet::cycle(keys, count)
  }
}
