//! Periodic presence updates.
//!
//! Each tick samples metrics, throttles against the last sent sample, and
//! pushes an activity through the [`Session`]. Send failures never stop the
//! loop; only the shutdown signal does, after which the session is logged
//! out.
//!
//! # Tick outcomes
//!
//! ```text
//! not logged in ──login fails──> NotConnected
//! sample fails ────────────────> SampleFailed
//! below thresholds ────────────> Skipped
//! send ok ─────────────────────> Sent
//! send fails, recovery ok ─────> Recovered
//! send fails, recovery fails ──> Failed
//! ```

mod profile;
mod retry;
mod threshold;

pub use profile::PresenceProfile;
pub use retry::{LinearBackoff, Limited};
pub use threshold::{Thresholds, should_update};

use crate::config::PresenceConfig;
use crate::error::ipc::IpcError;
use crate::ipc::{Connector, Session};
use crate::metrics::{MetricsProvider, MetricsSample};

use models::Activity;

use std::future::Future;
use std::time::{Duration, SystemTime};

use backoff::backoff::{Backoff, Constant};
use log::{debug, error, info, warn};
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep as TokioSleep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    NotConnected,
    SampleFailed,
    Skipped,
    Sent,
    Recovered,
    Failed,
}

pub struct Scheduler<C: Connector, M: MetricsProvider> {
    session: Session<C>,
    metrics: M,
    profile: PresenceProfile,
    thresholds: Thresholds,
    poll_interval: Duration,
    login_attempts: u32,
    retry_step: Duration,
    started_at: SystemTime,
    last_sent: Option<MetricsSample>,
}

impl<C: Connector, M: MetricsProvider> Scheduler<C, M> {
    pub fn new(
        session: Session<C>,
        metrics: M,
        profile: PresenceProfile,
        config: &PresenceConfig,
    ) -> Self {
        Self {
            session,
            metrics,
            profile,
            thresholds: Thresholds::from(&config.scheduler),
            poll_interval: config.scheduler.poll_interval(),
            login_attempts: config.reconnect.attempts.max(1),
            retry_step: config.reconnect.backoff(),
            started_at: SystemTime::now(),
            last_sent: None,
        }
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn last_sent(&self) -> Option<&MetricsSample> {
        self.last_sent.as_ref()
    }

    /// Startup login with constant backoff between attempts.
    ///
    /// # Errors
    ///
    /// Returns the last login error once every attempt has failed.
    pub async fn connect(&mut self) -> Result<(), IpcError> {
        let backoff = Limited::new(
            Constant::new(self.retry_step),
            self.login_attempts.saturating_sub(1),
        );
        self.login_with(backoff).await
    }

    /// Run one update cycle. Failures are logged and reported as an outcome.
    pub async fn tick(&mut self) -> TickOutcome {
        if !self.session.is_logged_in()
            && let Err(e) = self.session.login().await
        {
            warn!("Still not connected: {e}");
            return TickOutcome::NotConnected;
        }

        let sample = match self.metrics.sample() {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Skipping tick, metrics unavailable: {e}");
                return TickOutcome::SampleFailed;
            }
        };

        if !should_update(self.last_sent.as_ref(), &sample, &self.thresholds) {
            debug!(
                "Change below thresholds (CPU {:.1}%, RAM {:.1}%), skipping",
                sample.cpu_percent, sample.memory_percent
            );
            return TickOutcome::Skipped;
        }

        let activity = match self.profile.activity(&sample, self.started_at) {
            Ok(activity) => activity,
            Err(e) => {
                error!("Could not build activity: {e}");
                return TickOutcome::Failed;
            }
        };

        match self.session.send_activity(&activity).await {
            Ok(()) => {
                self.last_sent = Some(sample);
                TickOutcome::Sent
            }
            Err(e) if e.is_retryable() => {
                warn!("Activity update failed, starting recovery: {e}");
                match self.recover(&activity).await {
                    Ok(()) => {
                        info!("Recovered presence session");
                        self.last_sent = Some(sample);
                        TickOutcome::Recovered
                    }
                    Err(e) => {
                        error!("Recovery failed, will retry next tick: {e}");
                        TickOutcome::Failed
                    }
                }
            }
            Err(e) => {
                error!("Activity update rejected: {e}");
                TickOutcome::Failed
            }
        }
    }

    /// Tick on the poll interval until `shutdown` resolves, then log out.
    ///
    /// The first tick fires one full interval after startup, so CPU usage
    /// and network rates are measured over a real window. Shutdown is also
    /// honoured while the startup login is still backing off.
    ///
    /// # Errors
    ///
    /// Only a failed logout is returned; everything else is logged.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), IpcError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let connected = tokio::select! {
            _ = &mut shutdown => None,
            result = self.connect() => Some(result),
        };

        match connected {
            None => {
                info!("Shutdown requested during startup");
                return self.session.logout().await;
            }
            Some(Err(e)) => warn!("Starting without a session, retrying each tick: {e}"),
            Some(Ok(())) => {}
        }

        let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    let outcome = self.tick().await;
                    debug!("Tick finished: {outcome:?}");
                }
            }
        }

        self.session.logout().await
    }

    async fn recover(&mut self, activity: &Activity) -> Result<(), IpcError> {
        if let Err(e) = self.session.logout().await {
            warn!("Ignoring close failure during recovery: {e}");
        }

        let backoff = Limited::new(
            LinearBackoff::new(self.retry_step),
            self.login_attempts.saturating_sub(1),
        );
        self.login_with(backoff).await?;

        self.session.send_activity(activity).await
    }

    async fn login_with(&mut self, mut backoff: impl Backoff) -> Result<(), IpcError> {
        let mut attempt = 1;
        loop {
            let error = match self.session.login().await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            match backoff.next_backoff() {
                Some(delay) => {
                    warn!("Login attempt {attempt} failed, retrying in {delay:?}: {error}");
                    TokioSleep(delay).await;
                    attempt += 1;
                }
                None => {
                    error!("Login failed after {attempt} attempt(s): {error}");
                    return Err(error);
                }
            }
        }
    }
}
