//! Live session runner.
//!
//! Drives a [`BreathingSession`] from a [`TickDriver`] and streams its
//! events. The runner owns every scheduling resource of the session: the
//! periodic ticker and the one-shot completion hold. Each exit path
//! (completion, skip, technique swap, drop) closes them.
//!
//! ```ignore
//! let mut runner = SessionRunner::new(session, TickDriver::every_second(), hold);
//! runner.begin();
//! while let Some(event) = runner.next_event().await {
//!     render(&event);
//! }
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::events::Event;
use crate::session::{BreathingSession, Frame, Handoff, Screen};
use crate::timer::{TickControl, TickDriver, TickHandle};

pub struct SessionRunner {
    session: Arc<Mutex<BreathingSession>>,
    driver: TickDriver,
    completion_hold: Duration,
    ticker: Option<TickHandle>,
    exit_timer: Option<TickHandle>,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    finished: bool,
}

impl SessionRunner {
    pub fn new(session: BreathingSession, driver: TickDriver, completion_hold: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Arc::new(Mutex::new(session)),
            driver,
            completion_hold,
            ticker: None,
            exit_timer: None,
            tx,
            rx,
            finished: false,
        }
    }

    /// Run `f` against the current session state.
    pub fn with_session<R>(&self, f: impl FnOnce(&BreathingSession) -> R) -> Option<R> {
        self.session.lock().ok().map(|guard| f(&guard))
    }

    pub fn frame(&self) -> Option<Frame> {
        self.with_session(BreathingSession::frame)
    }

    /// True while a ticker or the completion hold is scheduled.
    pub fn is_scheduled(&self) -> bool {
        self.ticker.as_ref().is_some_and(TickHandle::is_active)
            || self.exit_timer.as_ref().is_some_and(TickHandle::is_active)
    }

    /// Dismiss the intro and start ticking.
    ///
    /// Returns false if the session was not on its intro screen.
    /// Must be called from within a tokio runtime.
    pub fn begin(&mut self) -> bool {
        let started = match self.session.lock() {
            Ok(mut guard) => guard.begin().map(|event| (guard.id(), event)),
            Err(_) => None,
        };
        let Some((id, event)) = started else {
            return false;
        };
        let _ = self.tx.send(event);

        let session = Arc::clone(&self.session);
        let tx = self.tx.clone();
        self.ticker = Some(self.driver.every(move || advance(&session, id, &tx)));
        true
    }

    /// Next event, in order. Returns `None` once the exit was delivered.
    ///
    /// Completion arms the hold timer here; when it fires, the session
    /// leaves the completion screen and an [`Event::Exited`] follows.
    pub async fn next_event(&mut self) -> Option<Event> {
        if self.finished {
            return None;
        }
        let event = self.rx.recv().await?;
        match &event {
            Event::SessionCompleted { .. } => self.arm_exit(),
            Event::Exited { .. } => {
                self.release();
                self.finished = true;
            }
            _ => {}
        }
        Some(event)
    }

    fn arm_exit(&mut self) {
        close(&mut self.ticker);
        let session = Arc::clone(&self.session);
        let tx = self.tx.clone();
        self.exit_timer = Some(TickDriver::after(self.completion_hold, move || {
            let handoff = match session.lock() {
                Ok(mut guard) => guard.finish(),
                Err(_) => None,
            };
            if let Some(handoff) = handoff {
                let _ = tx.send(Event::Exited {
                    handoff,
                    at: Utc::now(),
                });
            }
        }));
    }

    /// Leave now. Stops ticking before the session state changes, so no
    /// tick lands after this returns.
    pub fn skip(&mut self) -> Option<Handoff> {
        self.release();
        let (handoff, skipped) = {
            let mut guard = self.session.lock().ok()?;
            let was_completed = guard.screen() == Screen::Completion;
            let snapshot = guard.snapshot();
            let elapsed_secs = guard.elapsed_secs();
            let handoff = guard.skip()?;
            let skipped = (!was_completed).then(|| Event::SessionSkipped {
                cycle: snapshot.cycle,
                phase_index: snapshot.phase_index,
                elapsed_secs,
                at: Utc::now(),
            });
            (handoff, skipped)
        };

        if let Some(event) = skipped {
            let _ = self.tx.send(event);
        }
        let _ = self.tx.send(Event::Exited {
            handoff,
            at: Utc::now(),
        });
        Some(handoff)
    }

    /// Replace the session (e.g. a technique change). Pending ticks and
    /// undelivered events of the old session are discarded.
    pub fn restart(&mut self, session: BreathingSession) {
        self.release();
        let unplaced = match self.session.lock() {
            Ok(mut guard) => {
                *guard = session;
                None
            }
            Err(_) => Some(session),
        };
        if let Some(session) = unplaced {
            self.session = Arc::new(Mutex::new(session));
        }
        while self.rx.try_recv().is_ok() {}
        self.finished = false;
    }

    /// Tear down without handing off. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.release();
        if let Ok(mut guard) = self.session.lock() {
            let _ = guard.skip();
        }
        self.finished = true;
    }

    fn release(&mut self) {
        close(&mut self.ticker);
        close(&mut self.exit_timer);
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        self.release();
    }
}

/// One tick of the session with id `id`. Stops once the shared slot holds
/// a different session (after a restart) or the session left `Active`.
fn advance(
    session: &Mutex<BreathingSession>,
    id: Uuid,
    tx: &mpsc::UnboundedSender<Event>,
) -> TickControl {
    let Ok(mut guard) = session.lock() else {
        return TickControl::Stop;
    };
    if guard.id() != id || guard.screen() != Screen::Active {
        return TickControl::Stop;
    }
    let boundary = guard.tick();
    let snapshot = guard.snapshot();
    let still_active = guard.screen() == Screen::Active;
    drop(guard);

    let _ = tx.send(Event::StateSnapshot {
        snapshot,
        at: Utc::now(),
    });
    if let Some(event) = boundary {
        let _ = tx.send(event);
    }
    if still_active {
        TickControl::Continue
    } else {
        TickControl::Stop
    }
}

fn close(slot: &mut Option<TickHandle>) {
    if let Some(mut handle) = slot.take() {
        handle.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::Mood;
    use crate::session::ExitReason;
    use crate::technique;
    use crate::timer::TimerStatus;
    use tokio::time;

    fn runner(id: &str, cycles: u32) -> SessionRunner {
        let session = BreathingSession::new(technique::resolve(id), Mood::Restless, cycles).unwrap();
        SessionRunner::new(session, TickDriver::every_second(), Duration::from_secs(2))
    }

    #[tokio::test(start_paused = true)]
    async fn full_session_ends_with_completed_handoff() {
        let mut runner = runner("4-7-8", 3);
        assert!(runner.begin());
        assert!(!runner.begin());

        let mut snapshots = 0;
        let mut last = None;
        while let Some(event) = runner.next_event().await {
            if let Event::StateSnapshot { .. } = event {
                snapshots += 1;
            }
            last = Some(event);
        }

        assert_eq!(snapshots, 57);
        match last {
            Some(Event::Exited { handoff, .. }) => {
                assert_eq!(handoff.mood, Mood::Restless);
                assert_eq!(handoff.reason, ExitReason::Completed);
            }
            other => panic!("expected Exited, got {other:?}"),
        }
        assert!(!runner.is_scheduled());
        assert!(runner.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn skip_stops_ticks_immediately() {
        let mut runner = runner("box", 3);
        runner.begin();
        time::sleep(Duration::from_millis(5500)).await;

        let handoff = runner.skip().unwrap();
        assert_eq!(handoff.reason, ExitReason::Skipped);
        assert!(!runner.is_scheduled());
        let frozen = runner.frame().unwrap();

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runner.frame().unwrap(), frozen);
        assert_eq!(
            runner.with_session(|s| s.timer().status()),
            Some(TimerStatus::Stopped)
        );

        let mut tail = Vec::new();
        while let Some(event) = runner.next_event().await {
            tail.push(event);
        }
        let snapshots = tail
            .iter()
            .filter(|e| matches!(e, Event::StateSnapshot { .. }))
            .count();
        assert_eq!(snapshots, 5);
        assert!(matches!(
            tail.iter().rev().nth(1),
            Some(Event::SessionSkipped { elapsed_secs: 5, .. })
        ));
        assert!(tail.last().is_some_and(Event::is_exit));
    }

    #[tokio::test(start_paused = true)]
    async fn skip_during_completion_hold_exits_completed() {
        let mut runner = runner("coherent", 1);
        runner.begin();
        loop {
            match runner.next_event().await {
                Some(Event::SessionCompleted { .. }) => break,
                Some(_) => continue,
                None => panic!("runner ended before completion"),
            }
        }
        let handoff = runner.skip().unwrap();
        assert_eq!(handoff.reason, ExitReason::Completed);

        // The hold timer was cancelled: exactly one exit is delivered.
        time::sleep(Duration::from_secs(5)).await;
        let exits: Vec<_> = std::iter::from_fn(|| runner.rx.try_recv().ok())
            .filter(Event::is_exit)
            .collect();
        assert_eq!(exits.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_discards_old_session() {
        let mut runner = runner("box", 3);
        runner.begin();
        time::sleep(Duration::from_millis(3500)).await;

        let fresh = BreathingSession::new(technique::resolve("coherent"), Mood::Sad, 1).unwrap();
        runner.restart(fresh);
        assert!(!runner.is_scheduled());
        assert_eq!(runner.with_session(|s| s.screen()), Some(Screen::Intro));

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runner.with_session(|s| s.elapsed_secs()), Some(0));

        assert!(runner.begin());
        match runner.next_event().await {
            Some(Event::SessionStarted { technique_id, .. }) => assert_eq!(technique_id, "coherent"),
            other => panic!("expected SessionStarted, got {other:?}"),
        }
    }

    #[test]
    fn stale_ticker_leaves_replacement_untouched() {
        let old = BreathingSession::new(technique::resolve("box"), Mood::Sad, 3).unwrap();
        let old_id = old.id();
        let slot = Mutex::new(old);
        let (tx, mut rx) = mpsc::unbounded_channel();
        slot.lock().unwrap().begin();
        assert_eq!(advance(&slot, old_id, &tx), TickControl::Continue);

        let mut fresh = BreathingSession::new(technique::resolve("coherent"), Mood::Sad, 1).unwrap();
        fresh.begin();
        *slot.lock().unwrap() = fresh;
        while rx.try_recv().is_ok() {}

        assert_eq!(advance(&slot, old_id, &tx), TickControl::Stop);
        assert_eq!(slot.lock().unwrap().elapsed_secs(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_then_begin_ticks_only_the_new_session() {
        let mut runner = runner("box", 3);
        runner.begin();
        time::sleep(Duration::from_millis(2500)).await;

        let fresh = BreathingSession::new(technique::resolve("coherent"), Mood::Sad, 1).unwrap();
        runner.restart(fresh);
        assert!(runner.begin());
        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(runner.with_session(|s| s.elapsed_secs()), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_releases_everything() {
        let mut runner = runner("box", 3);
        runner.begin();
        time::sleep(Duration::from_millis(1500)).await;
        runner.shutdown();
        runner.shutdown();
        assert!(!runner.is_scheduled());
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runner.with_session(|s| s.elapsed_secs()), Some(1));
        assert!(runner.next_event().await.is_none());
    }
}
