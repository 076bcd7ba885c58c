use crate::config::SchedulerConfig;
use crate::metrics::MetricsSample;

/// Minimum change that makes a new sample worth sending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub cpu_pct: f64,
    pub memory_pct: f64,
    pub network_bytes_per_sec: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_pct: 2.0,
            memory_pct: 2.0,
            network_bytes_per_sec: 10.0 * 1024.0,
        }
    }
}

impl From<&SchedulerConfig> for Thresholds {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            cpu_pct: config.cpu_threshold_pct,
            memory_pct: config.memory_threshold_pct,
            network_bytes_per_sec: config.network_threshold_bytes as f64,
        }
    }
}

/// Decide whether `current` differs enough from the last sent sample.
///
/// Always true when nothing has been sent yet. CPU and memory compare the
/// absolute percentage-point delta; network compares the current aggregate
/// throughput against its threshold.
pub fn should_update(
    last_sent: Option<&MetricsSample>,
    current: &MetricsSample,
    thresholds: &Thresholds,
) -> bool {
    let Some(last) = last_sent else {
        return true;
    };

    (current.cpu_percent - last.cpu_percent).abs() >= thresholds.cpu_pct
        || (current.memory_percent - last.memory_percent).abs() >= thresholds.memory_pct
        || current.network_bytes_per_sec() >= thresholds.network_bytes_per_sec
}
