// Key set with duplicates
// 带重复的 key 集合

use crate::Key;

/// Number of duplicate slots for `count` keys at `ratio`
/// `count` 个 key 在 `ratio` 下的重复槽位数
///
/// `floor(count * ratio)`, ratio clamped to [0, 1]. At least one key stays
/// unique when `count > 0`.
/// 至少保留一个唯一 key。
pub fn dup_count(count: usize, ratio: f64) -> usize {
  if count == 0 {
    return 0;
  }
  let ratio = if ratio.is_nan() {
    0.0
  } else {
    ratio.clamp(0.0, 1.0)
  };
  let dup = (count as f64 * ratio).floor() as usize;
  dup.min(count - 1)
}

/// Ordered keys of one run; the tail repeats the unique prefix cyclically
/// 单次运行的有序 key；尾部循环重复唯一前缀
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeySet {
  keys: Vec<Key>,
  unique: usize,
}

impl KeySet {
  /// Extend `unique` keys to `count` slots, slot `unique + j` = `unique[j % n]`
  /// 将唯一 key 扩展到 `count` 个槽位
  ///
  /// `keys` must be non-empty unless `count == 0`.
  pub(crate) fn cycle(mut keys: Vec<Key>, count: usize) -> Self {
    debug_assert!(
      !keys.is_empty() || count == 0,
      "cycle {count} slots over no keys"
    );
    let unique = keys.len().min(count);
    keys.truncate(unique);
    if unique > 0 {
      keys.reserve(count - unique);
      for j in 0..count - unique {
        let key = keys[j % unique];
        keys.push(key);
      }
    }
    Self { keys, unique }
  }

  #[inline]
  pub fn keys(&self) -> &[Key] {
    &self.keys
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.keys.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }

  /// Distinct key count / 唯一 key 数
  #[inline]
  pub fn unique(&self) -> usize {
    self.unique
  }

  /// Slots aliasing an earlier key / 重复槽位数
  #[inline]
  pub fn dup(&self) -> usize {
    self.keys.len() - self.unique
  }

  /// Sorted distinct keys, input of bulk ingestion
  /// 排序去重后的 key，用于批量导入
  pub fn sorted_unique(&self) -> Vec<Key> {
    let mut li = self.keys[..self.unique].to_vec();
    li.sort_unstable();
    li.dedup();
    li
  }
}
