// Per-call latency histogram over HdrHistogram
// 基于 HdrHistogram 的单次调用延迟直方图

use std::time::Duration;

use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Max latency value: 1 hour in nanoseconds
/// 最大延迟值：1小时（纳秒）
const MAX_LATENCY_NS: u64 = 3_600_000_000_000;

/// Significant figures for histogram precision
/// 直方图精度的有效数字
const SIGFIG: u8 = 3;

/// Latency of engine calls in one phase
/// 单个阶段中引擎调用的延迟
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
  inner: Histogram<u64>,
}

impl LatencyHistogram {
  pub fn new() -> Result<Self> {
    let inner = Histogram::new_with_bounds(1, MAX_LATENCY_NS, SIGFIG)?;
    Ok(Self { inner })
  }

  /// Record one call, clamped to [1ns, 1h]
  /// 记录一次调用，限制在 [1ns, 1h]
  #[inline]
  pub fn record(&mut self, elapsed: Duration) {
    let ns = (elapsed.as_nanos() as u64).clamp(1, MAX_LATENCY_NS);
    let _ = self.inner.record(ns);
  }

  pub fn count(&self) -> u64 {
    self.inner.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }

  pub fn stats(&self) -> LatencyStats {
    LatencyStats::from(self)
  }
}

/// Serializable latency stats snapshot, nanoseconds
/// 可序列化的延迟统计快照（纳秒）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LatencyStats {
  pub min: u64,
  pub max: u64,
  pub mean: f64,
  pub p50: u64,
  pub p99: u64,
  pub p999: u64,
  pub count: u64,
}

impl From<&LatencyHistogram> for LatencyStats {
  fn from(h: &LatencyHistogram) -> Self {
    if h.is_empty() {
      return Self::default();
    }
    let inner = &h.inner;
    Self {
      min: inner.min(),
      max: inner.max(),
      mean: inner.mean(),
      p50: inner.value_at_quantile(0.50),
      p99: inner.value_at_quantile(0.99),
      p999: inner.value_at_quantile(0.999),
      count: inner.len(),
    }
  }
}
