use std::time::{Duration, Instant};

use specnote_config::Settings;

/// A repeating deadline, polled by the owner's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveTimer {
    period: Duration,
    next_due: Instant,
}

impl AutosaveTimer {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// Fire at most once; a late poll does not replay missed ticks.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.period;
        true
    }
}

/// Owns the single autosave timer and rebuilds it from settings.
///
/// Only `autosave_enabled` and `autosave_interval` matter; any change to
/// either tears the running timer down, so the old period never fires again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveScheduler {
    enabled: bool,
    interval: u32,
    timer: Option<AutosaveTimer>,
}

impl AutosaveScheduler {
    pub fn new(settings: &Settings, now: Instant) -> Self {
        let mut scheduler = Self {
            enabled: settings.autosave_enabled,
            interval: settings.autosave_interval,
            timer: None,
        };
        scheduler.rebuild(settings, now);
        scheduler
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn timer(&self) -> Option<&AutosaveTimer> {
        self.timer.as_ref()
    }

    /// Returns true when the timer was rebuilt.
    pub fn reconfigure(&mut self, settings: &Settings, now: Instant) -> bool {
        if settings.autosave_enabled == self.enabled && settings.autosave_interval == self.interval
        {
            return false;
        }
        self.enabled = settings.autosave_enabled;
        self.interval = settings.autosave_interval;
        self.rebuild(settings, now);
        true
    }

    fn rebuild(&mut self, settings: &Settings, now: Instant) {
        self.timer = settings
            .autosave_enabled
            .then(|| AutosaveTimer::new(settings.autosave_period(), now));
        match &self.timer {
            Some(timer) => log::info!("Autosave every {}s", timer.period().as_secs()),
            None => log::info!("Autosave disabled"),
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        self.timer.as_mut().is_some_and(|timer| timer.poll(now))
    }
}
