//! Live system metrics for the update scheduler.
//!
//! The scheduler only sees [`MetricsSample`] values; how they are gathered
//! stays behind [`MetricsProvider`]. Samples are plain copies, never shared
//! mutable state.

use crate::error::metrics::MetricsError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Instant;

use log::trace;
use sysinfo::{Networks, System};

/// One reading of the tracked dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricsSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub rx_bytes_per_sec: f64,
    pub tx_bytes_per_sec: f64,
}

impl MetricsSample {
    /// Aggregate throughput in both directions.
    pub fn network_bytes_per_sec(&self) -> f64 {
        self.rx_bytes_per_sec + self.tx_bytes_per_sec
    }
}

pub trait MetricsProvider: Send {
    fn sample(&mut self) -> Result<MetricsSample, MetricsError>;
}

/// [`MetricsProvider`] backed by `sysinfo`.
///
/// CPU usage and network throughput are deltas, so the provider primes both
/// on construction and every sample measures the span since the previous one.
/// Samples taken sooner than `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` after the
/// previous refresh report unreliable CPU usage; the scheduler's first tick
/// waits a full poll interval for this reason.
pub struct SysinfoMetrics {
    system: System,
    networks: Networks,
    last_totals: NetworkTotals,
    last_sampled: Instant,
}

#[derive(Debug, Clone, Copy, Default)]
struct NetworkTotals {
    received: u64,
    transmitted: u64,
}

impl SysinfoMetrics {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();

        let networks = Networks::new_with_refreshed_list();
        let last_totals = network_totals(&networks);

        Self {
            system,
            networks,
            last_totals,
            last_sampled: Instant::now(),
        }
    }
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SysinfoMetrics {
    fn sample(&mut self) -> Result<MetricsSample, MetricsError> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.networks.refresh(true);

        let cpu_percent = f64::from(self.system.global_cpu_usage());
        if !cpu_percent.is_finite() {
            return Err(MetricsError::Sample {
                message: format!("CPU usage is not a number: {cpu_percent}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let total_memory = self.system.total_memory();
        if total_memory == 0 {
            return Err(MetricsError::Sample {
                message: "Total memory reported as zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        let memory_percent = self.system.used_memory() as f64 / total_memory as f64 * 100.0;

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_sampled).as_secs_f64();
        let totals = network_totals(&self.networks);

        let (rx_bytes_per_sec, tx_bytes_per_sec) = if elapsed > 0.0 {
            (
                totals.received.saturating_sub(self.last_totals.received) as f64 / elapsed,
                totals.transmitted.saturating_sub(self.last_totals.transmitted) as f64 / elapsed,
            )
        } else {
            (0.0, 0.0)
        };

        self.last_totals = totals;
        self.last_sampled = now;

        let sample = MetricsSample {
            cpu_percent,
            memory_percent,
            rx_bytes_per_sec,
            tx_bytes_per_sec,
        };
        trace!("Sampled metrics: {sample:?}");
        Ok(sample)
    }
}

fn network_totals(networks: &Networks) -> NetworkTotals {
    networks
        .iter()
        .fold(NetworkTotals::default(), |acc, (_, data)| NetworkTotals {
            received: acc.received.saturating_add(data.total_received()),
            transmitted: acc.transmitted.saturating_add(data.total_transmitted()),
        })
}
