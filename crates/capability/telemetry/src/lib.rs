//! 追踪与请求 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 抓取级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub fetch_success: u64,
    pub fetch_failure: u64,
    pub decode_failure: u64,
    pub dropped_anlagen: u64,
    pub cache_writes: u64,
}

/// 基础指标。
pub struct TelemetryMetrics {
    fetch_success: AtomicU64,
    fetch_failure: AtomicU64,
    decode_failure: AtomicU64,
    dropped_anlagen: AtomicU64,
    cache_writes: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            fetch_success: AtomicU64::new(0),
            fetch_failure: AtomicU64::new(0),
            decode_failure: AtomicU64::new(0),
            dropped_anlagen: AtomicU64::new(0),
            cache_writes: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetch_success: self.fetch_success.load(Ordering::Relaxed),
            fetch_failure: self.fetch_failure.load(Ordering::Relaxed),
            decode_failure: self.decode_failure.load(Ordering::Relaxed),
            dropped_anlagen: self.dropped_anlagen.load(Ordering::Relaxed),
            cache_writes: self.cache_writes.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录抓取成功次数。
pub fn record_fetch_success() {
    metrics().fetch_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录抓取失败次数。
pub fn record_fetch_failure() {
    metrics().fetch_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录信封解码失败次数。
pub fn record_decode_failure() {
    metrics().decode_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录因缺少主表被丢弃的 Anlage 数。
pub fn record_dropped_anlagen(count: u64) {
    metrics().dropped_anlagen.fetch_add(count, Ordering::Relaxed);
}

/// 记录缓存写入次数。
pub fn record_cache_write() {
    metrics().cache_writes.fetch_add(1, Ordering::Relaxed);
}
