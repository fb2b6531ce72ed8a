// Random 128-bit key generation for storage benchmarks
// 存储基准测试的 128 位随机键生成

#![cfg_attr(docsrs, feature(doc_cfg))]

mod keygen;
mod keyset;

pub use keygen::{KEY_LEN, Key, KeyGen};
pub use keyset::{KeySet, dup_count};
