//! Time-windowed counters: premium prompt frequency and the do-good tally.
//!
//! Both are small state structs driven by an injected [`Clock`] and loaded
//! and saved through [`CounterStore`], the only code touching their keys.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::StorageError;
use crate::storage::{DoGoodConfig, KeyValueStore, PremiumConfig};

const PREMIUM_PROMPT_KEY: &str = "premium_prompt";
const DO_GOOD_KEY: &str = "do_good";

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map_or_else(|e| *e.into_inner(), |now| *now)
    }
}

/// How often the premium upsell may appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFrequency {
    pub shown_in_window: u32,
    pub window_started_at: Option<DateTime<Utc>>,
}

impl PromptFrequency {
    fn window_expired(&self, now: DateTime<Utc>, config: &PremiumConfig) -> bool {
        let window = Duration::minutes(i64::from(config.prompt_window_minutes));
        self.window_started_at
            .map_or(true, |start| now - start >= window)
    }

    pub fn should_prompt(&self, now: DateTime<Utc>, config: &PremiumConfig) -> bool {
        let shown = if self.window_expired(now, config) {
            0
        } else {
            self.shown_in_window
        };
        shown < config.max_prompts_per_window
    }

    pub fn record_shown(&mut self, now: DateTime<Utc>, config: &PremiumConfig) {
        if self.window_expired(now, config) {
            self.window_started_at = Some(now);
            self.shown_in_window = 0;
        }
        self.shown_in_window += 1;
    }
}

/// Good deeds completed within the current day-long streak window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoGoodTally {
    pub count: u32,
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl DoGoodTally {
    fn expired(&self, now: DateTime<Utc>, config: &DoGoodConfig) -> bool {
        let window = Duration::hours(i64::from(config.reset_after_hours));
        self.last_completed_at
            .map_or(false, |last| now - last >= window)
    }

    pub fn current(&self, now: DateTime<Utc>, config: &DoGoodConfig) -> u32 {
        if self.expired(now, config) {
            0
        } else {
            self.count
        }
    }

    /// Count one completion and return the new tally.
    pub fn record(&mut self, now: DateTime<Utc>, config: &DoGoodConfig) -> u32 {
        if self.expired(now, config) {
            self.count = 0;
        }
        self.count += 1;
        self.last_completed_at = Some(now);
        self.count
    }
}

/// Persistence port for both counters.
///
/// Reads never fail: a missing, unreadable or corrupt record loads as a
/// fresh one.
pub struct CounterStore<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> CounterStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn prompt_frequency(&self) -> PromptFrequency {
        self.load(PREMIUM_PROMPT_KEY)
    }

    pub fn save_prompt_frequency(&self, value: &PromptFrequency) -> Result<(), StorageError> {
        self.save(PREMIUM_PROMPT_KEY, value)
    }

    pub fn do_good(&self) -> DoGoodTally {
        self.load(DO_GOOD_KEY)
    }

    pub fn save_do_good(&self, value: &DoGoodTally) -> Result<(), StorageError> {
        self.save(DO_GOOD_KEY, value)
    }

    /// Check whether the upsell may show now, recording it if so.
    pub fn take_prompt_slot<C: Clock + ?Sized>(&self, clock: &C, config: &PremiumConfig) -> bool {
        let now = clock.now();
        let mut frequency = self.prompt_frequency();
        if !frequency.should_prompt(now, config) {
            return false;
        }
        frequency.record_shown(now, config);
        if let Err(e) = self.save_prompt_frequency(&frequency) {
            tracing::warn!(error = %e, "premium prompt frequency not persisted");
        }
        true
    }

    /// Record a good deed and return the running tally.
    pub fn record_do_good<C: Clock + ?Sized>(&self, clock: &C, config: &DoGoodConfig) -> u32 {
        let mut tally = self.do_good();
        let count = tally.record(clock.now(), config);
        if let Err(e) = self.save_do_good(&tally) {
            tracing::warn!(error = %e, "do-good tally not persisted");
        }
        count
    }

    fn load<T: Default + for<'de> Deserialize<'de>>(&self, key: &str) -> T {
        match self.store.get(key) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "resetting unreadable counter");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "counter storage unavailable");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|e| StorageError::Encoding {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::BrokenStore;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn prompt_shows_once_per_window() {
        let store = MemoryStore::new();
        let counters = CounterStore::new(&store);
        let clock = clock();
        let config = PremiumConfig::default();

        assert!(counters.take_prompt_slot(&clock, &config));
        assert!(!counters.take_prompt_slot(&clock, &config));

        clock.advance(Duration::minutes(29));
        assert!(!counters.take_prompt_slot(&clock, &config));

        clock.advance(Duration::minutes(1));
        assert!(counters.take_prompt_slot(&clock, &config));
        assert_eq!(counters.prompt_frequency().shown_in_window, 1);
    }

    #[test]
    fn prompt_limit_is_configurable() {
        let store = MemoryStore::new();
        let counters = CounterStore::new(&store);
        let clock = clock();
        let config = PremiumConfig {
            prompt_window_minutes: 30,
            max_prompts_per_window: 2,
        };
        assert!(counters.take_prompt_slot(&clock, &config));
        assert!(counters.take_prompt_slot(&clock, &config));
        assert!(!counters.take_prompt_slot(&clock, &config));
    }

    #[test]
    fn do_good_resets_after_a_day() {
        let store = MemoryStore::new();
        let counters = CounterStore::new(&store);
        let clock = clock();
        let config = DoGoodConfig::default();

        assert_eq!(counters.record_do_good(&clock, &config), 1);
        clock.advance(Duration::hours(5));
        assert_eq!(counters.record_do_good(&clock, &config), 2);

        clock.advance(Duration::hours(24));
        assert_eq!(counters.do_good().current(clock.now(), &config), 0);
        assert_eq!(counters.record_do_good(&clock, &config), 1);
    }

    #[test]
    fn corrupt_blob_loads_fresh() {
        let store = MemoryStore::new();
        store.set(DO_GOOD_KEY, "[1, 2").unwrap();
        let counters = CounterStore::new(&store);
        assert_eq!(counters.do_good(), DoGoodTally::default());
    }

    #[test]
    fn broken_storage_still_counts_in_session() {
        let counters = CounterStore::new(&BrokenStore);
        let clock = clock();
        assert_eq!(counters.record_do_good(&clock, &DoGoodConfig::default()), 1);
        assert!(counters.take_prompt_slot(&clock, &PremiumConfig::default()));
    }
}
