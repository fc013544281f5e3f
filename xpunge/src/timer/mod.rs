//! # Timer
//!
//! Module dedicated to the timer scheduler. The host delivers ticks
//! (for example once per minute, see [`ticker`]), and for each tick
//! the scheduler decides whether the timer batch should run.
//!
//! Two triggers exist:
//!
//! - the absolute trigger fires when the wall-clock hour and minute
//!   match the `timer_absolute` preference,
//!
//! - the interval trigger fires once after a startup delay, then
//!   every loop delay.
//!
//! The absolute trigger is checked first. When it fires, the interval
//! trigger is not checked for this tick, so that at most one run
//! happens per tick.

pub mod config;
#[cfg(feature = "tokio")]
pub mod ticker;

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::{
    batch::{self, Batch, BatchReport},
    preferences::{PreferenceStore, Preferences},
    Result, Xpunge,
};

use self::config::{check_loop_interval, minutes_to_millis, AbsoluteTime};

#[cfg(feature = "tokio")]
#[doc(inline)]
pub use self::ticker::Ticker;

/// The timer state.
///
/// Bookkeeping persisted across ticks, in epoch milliseconds. A zero
/// value means never recorded. Only the scheduler mutates it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TimerState {
    /// Time of the last timer run.
    pub last_timer_run: i64,

    /// Time of the first tick observed since install or restart.
    pub startup: i64,
}

impl TimerState {
    pub const LAST_TIMER_RUN_KEY: &'static str = "lastTimerRun";
    pub const STARTUP_KEY: &'static str = "startup";

    /// Load the timer state from the given store.
    pub async fn load(store: &dyn PreferenceStore) -> Result<Self> {
        Ok(Self {
            last_timer_run: load_millis(store, Self::LAST_TIMER_RUN_KEY).await?,
            startup: load_millis(store, Self::STARTUP_KEY).await?,
        })
    }

    pub async fn save_last_timer_run(store: &dyn PreferenceStore, millis: i64) -> Result<()> {
        store.set(Self::LAST_TIMER_RUN_KEY, Value::from(millis)).await
    }

    pub async fn save_startup(store: &dyn PreferenceStore, millis: i64) -> Result<()> {
        store.set(Self::STARTUP_KEY, Value::from(millis)).await
    }
}

async fn load_millis(store: &dyn PreferenceStore, key: &str) -> Result<i64> {
    match store.get(key).await? {
        None => Ok(0),
        Some(value) => match value.as_i64() {
            Some(millis) => Ok(millis),
            None => {
                warn!(key, ?value, "invalid timer state, resetting it");
                Ok(0)
            }
        },
    }
}

/// The timer trigger that caused a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Trigger {
    /// The wall-clock time matched the absolute timer.
    Absolute,

    /// The startup delay passed and the timer never ran.
    Startup,

    /// The loop delay passed since the last run.
    Interval,
}

/// The outcome of one tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// No trigger is enabled, or the absolute one did not match.
    Idle,

    /// First tick ever: the startup time has been recorded.
    StartupRecorded,

    /// The interval trigger is not due yet.
    NotDue,

    /// The interval preferences are malformed.
    InvalidInterval,

    /// The timer batch ran.
    Fired(Trigger, BatchReport),
}

impl Xpunge {
    /// Handle one timer tick.
    pub async fn handle_timer(&self) -> Result<TickOutcome> {
        let prefs = self.preferences.get_all().await?;

        if prefs.timer_absolute_enabled {
            if let Some(report) = self.handle_absolute_timer(&prefs).await? {
                return Ok(TickOutcome::Fired(Trigger::Absolute, report));
            }
        }

        if prefs.timer_interval_enabled {
            return self.handle_interval_timer(&prefs).await;
        }

        Ok(TickOutcome::Idle)
    }

    async fn handle_absolute_timer(&self, prefs: &Preferences) -> Result<Option<BatchReport>> {
        let time = match prefs.timer_absolute.parse::<AbsoluteTime>() {
            Ok(time) => time,
            Err(err) => {
                warn!("{err}");
                return Ok(None);
            }
        };

        if !time.matches(&self.clock.now()) {
            trace!(?time, "absolute timer does not match current time");
            return Ok(None);
        }

        info!("executing absolute timer expunction");
        Ok(Some(self.run_timer().await?))
    }

    async fn handle_interval_timer(&self, prefs: &Preferences) -> Result<TickOutcome> {
        let now = self.clock.now().timestamp_millis();
        let store = self.preferences.store().as_ref();
        let TimerState {
            last_timer_run,
            startup,
        } = TimerState::load(store).await?;

        let startup_delay =
            check_loop_interval("timer_interval_startup", &prefs.timer_interval_startup);
        let loop_delay = check_loop_interval("timer_interval_loop", &prefs.timer_interval_loop);

        let (startup_delay, loop_delay) = match (startup_delay, loop_delay) {
            (Ok(startup), Ok(delay)) => (minutes_to_millis(startup), minutes_to_millis(delay)),
            _ => return Ok(TickOutcome::InvalidInterval),
        };

        if startup == 0 {
            debug!(now, "recording startup time");
            TimerState::save_startup(store, now).await?;
            return Ok(TickOutcome::StartupRecorded);
        }

        if startup_delay > 0 && now.saturating_sub(startup) < startup_delay {
            debug!("startup delay not reached yet");
            return Ok(TickOutcome::NotDue);
        }

        if startup_delay > 0 && last_timer_run == 0 {
            info!("executing startup timer expunction");
            let report = self.run_timer().await?;
            return Ok(TickOutcome::Fired(Trigger::Startup, report));
        }

        if loop_delay > 0 && now.saturating_sub(last_timer_run) > loop_delay {
            info!("executing interval timer expunction");
            let report = self.run_timer().await?;
            return Ok(TickOutcome::Fired(Trigger::Interval, report));
        }

        Ok(TickOutcome::NotDue)
    }

    /// Record the run then process the timer folder lists.
    async fn run_timer(&self) -> Result<BatchReport> {
        let now = self.clock.now().timestamp_millis();
        TimerState::save_last_timer_run(self.preferences.store().as_ref(), now).await?;

        let prefs = self.preferences.get_all().await?;
        let batch = Batch {
            junk: prefs.timer_junk_accounts,
            trash: prefs.timer_trash_accounts,
            compact: prefs.timer_compact_folders,
        };

        Ok(batch::run(self.backend.as_ref(), &batch).await)
    }
}
