//! # Ticker
//!
//! The [`Ticker`] plays the role of the host alarm: it delivers ticks
//! to [`Xpunge::handle_timer`] at a fixed period. Ticks never
//! overlap, a tick is awaited to completion before the next one is
//! considered. Ticks missed while a batch was running are skipped.

use std::{future::Future, time::Duration};

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::Xpunge;

use super::TickOutcome;

/// Period matching the minute resolution of the absolute timer.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ticker {
    period: Duration,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl Ticker {
    /// Build a ticker delivering ticks at the given period.
    ///
    /// A zero period falls back to [`DEFAULT_TICK_PERIOD`].
    pub fn new(period: Duration) -> Self {
        if period.is_zero() {
            warn!("invalid zero tick period, using {DEFAULT_TICK_PERIOD:?}");
            return Self::default();
        }

        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Deliver ticks until the given future resolves.
    ///
    /// The first tick is delivered straight away. The stop future is
    /// only checked between ticks, a running batch is never
    /// interrupted. Returns the number of delivered ticks.
    pub async fn run_until(&self, xpunge: &Xpunge, stop: impl Future<Output = ()>) -> usize {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(stop);
        let mut ticks = 0;

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => {
                    debug!(ticks, "stopping ticker");
                    break ticks;
                }
                _ = interval.tick() => {
                    ticks += 1;
                    match xpunge.handle_timer().await {
                        Ok(TickOutcome::Fired(trigger, report)) => {
                            debug!(?trigger, ?report, "timer tick fired");
                        }
                        Ok(outcome) => debug!(?outcome, "timer tick done"),
                        Err(err) => warn!("cannot handle timer tick: {err}"),
                    }
                }
            }
        }
    }
}
