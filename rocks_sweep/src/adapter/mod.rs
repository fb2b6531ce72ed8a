// Adapter modules / 适配器模块

pub mod mem;

#[cfg(feature = "rocksdb")]
pub mod rocksdb;
