//! Tick scheduling.
//!
//! Every periodic or delayed callback is owned through a [`TickHandle`].
//! Closing the handle (explicitly or by dropping it) aborts the task and
//! clears the active flag the task checks before each callback, so a tick
//! already in flight cannot reach the session after teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Returned by a periodic callback to keep or end the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Scheduling resource for one periodic or one-shot callback.
#[derive(Debug)]
pub struct TickHandle {
    active: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl TickHandle {
    /// True until the handle is closed or the callback ended the subscription.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Release the scheduled task.
    ///
    /// Returns true only for the call that actually deactivated it; closing
    /// twice, or after the callback stopped itself, returns false.
    pub fn close(&mut self) -> bool {
        let was_active = self.active.swap(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        was_active
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TickDriver {
    period: Duration,
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::every_second()
    }
}

impl TickDriver {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Call `on_tick` once per period, first after one full period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn every<F>(&self, mut on_tick: F) -> TickHandle
    where
        F: FnMut() -> TickControl + Send + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                if on_tick() == TickControl::Stop {
                    flag.store(false, Ordering::SeqCst);
                    break;
                }
            }
        });

        TickHandle {
            active,
            task: Some(task),
        }
    }

    /// Call `callback` once after `delay`, unless the handle is closed first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn after<F>(delay: Duration, callback: F) -> TickHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);

        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            if flag.swap(false, Ordering::SeqCst) {
                callback();
            }
        });

        TickHandle {
            active,
            task: Some(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test(start_paused = true)]
    async fn every_fires_once_per_period() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let _handle = TickDriver::every_second().every(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            TickControl::Continue
        });

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn close_stops_future_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let mut handle = TickDriver::every_second().every(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            TickControl::Continue
        });

        time::sleep(Duration::from_millis(2500)).await;
        assert!(handle.close());
        assert!(!handle.close());
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn callback_can_end_subscription() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let mut handle = TickDriver::every_second().every(move || {
            if seen.fetch_add(1, Ordering::SeqCst) == 1 {
                TickControl::Stop
            } else {
                TickControl::Continue
            }
        });

        time::sleep(Duration::from_secs(6)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!handle.is_active());
        assert!(!handle.close());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let handle = TickDriver::every_second().every(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            TickControl::Continue
        });
        time::sleep(Duration::from_millis(1500)).await;
        drop(handle);
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn after_fires_once_unless_closed() {
        let fired = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&fired);
        let handle = TickDriver::after(Duration::from_secs(2), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!handle.is_active());

        let seen = Arc::clone(&fired);
        let mut cancelled = TickDriver::after(Duration::from_secs(2), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        time::sleep(Duration::from_secs(1)).await;
        assert!(cancelled.close());
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
