//! Cycle timer.
//!
//! A tick-driven state machine over a [`FlattenedCycle`]. It owns no clock
//! and no thread: the caller invokes `tick()` once per elapsed second
//! (see [`TickDriver`](super::TickDriver)).
//!
//! ## State Transitions
//!
//! ```text
//! Intro -> Active -> Complete
//!   \        \
//!    +--------+--> Stopped   (early skip)
//! ```
//!
//! Ticks outside `Active` are ignored, so a tick that races a skip or a
//! completion never mutates state.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::technique::{FlattenedCycle, Phase, PhaseKind};

/// Cycles per session in the stock configuration.
pub const DEFAULT_CYCLES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    /// Waiting for the user to start.
    Intro,
    Active,
    /// Final cycle finished; final state is held.
    Complete,
    /// Skipped before completion.
    Stopped,
}

/// Read-only view handed to the rendering layer after every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub status: TimerStatus,
    pub phase: PhaseKind,
    pub label: String,
    pub phase_index: usize,
    pub seconds_remaining: u32,
    pub phase_progress_pct: f64,
    pub cycle_progress_pct: f64,
    pub cycle: u32,
    pub total_cycles: u32,
}

#[derive(Debug, Clone)]
pub struct CycleTimer {
    cycle: FlattenedCycle,
    status: TimerStatus,
    total_cycles: u32,
    /// 1-indexed.
    current_cycle: u32,
    phase_index: usize,
    elapsed_in_phase: u32,
    elapsed_in_cycle: u32,
    /// Ticks applied while active, across all cycles.
    ticks: u64,
}

impl CycleTimer {
    /// Create a timer in the `Intro` state.
    ///
    /// # Errors
    /// Returns [`ValidationError::ZeroCycles`] when `total_cycles` is 0.
    pub fn new(cycle: FlattenedCycle, total_cycles: u32) -> Result<Self, ValidationError> {
        if total_cycles == 0 {
            return Err(ValidationError::ZeroCycles);
        }
        Ok(Self {
            cycle,
            status: TimerStatus::Intro,
            total_cycles,
            current_cycle: 1,
            phase_index: 0,
            elapsed_in_phase: 0,
            elapsed_in_cycle: 0,
            ticks: 0,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == TimerStatus::Active
    }

    pub fn flattened(&self) -> &FlattenedCycle {
        &self.cycle
    }

    pub fn current_cycle(&self) -> u32 {
        self.current_cycle
    }

    pub fn total_cycles(&self) -> u32 {
        self.total_cycles
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        self.cycle.phase(self.phase_index)
    }

    pub fn elapsed_in_phase(&self) -> u32 {
        self.elapsed_in_phase
    }

    pub fn elapsed_in_cycle(&self) -> u32 {
        self.elapsed_in_cycle
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn current_duration(&self) -> u32 {
        self.current_phase().map_or(1, |p| p.duration_secs)
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.current_duration().saturating_sub(self.elapsed_in_phase)
    }

    /// 0.0 ..= 100.0 progress within the current phase.
    pub fn phase_progress_pct(&self) -> f64 {
        let duration = f64::from(self.current_duration());
        (f64::from(self.elapsed_in_phase) / duration * 100.0).min(100.0)
    }

    /// 0.0 ..= 100.0 progress within the current cycle.
    pub fn cycle_progress_pct(&self) -> f64 {
        let total = self.cycle.total_secs();
        if total == 0 {
            return 0.0;
        }
        (f64::from(self.elapsed_in_cycle) / f64::from(total) * 100.0).min(100.0)
    }

    pub fn snapshot(&self) -> TickSnapshot {
        let phase = self.current_phase();
        TickSnapshot {
            status: self.status,
            phase: phase.map_or(PhaseKind::Inhale, |p| p.name),
            label: phase.map(|p| p.label.clone()).unwrap_or_default(),
            phase_index: self.phase_index,
            seconds_remaining: self.seconds_remaining(),
            phase_progress_pct: self.phase_progress_pct(),
            cycle_progress_pct: self.cycle_progress_pct(),
            cycle: self.current_cycle,
            total_cycles: self.total_cycles,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Leave the intro. Returns false if the timer was not in `Intro`.
    pub fn start(&mut self) -> bool {
        if self.status != TimerStatus::Intro {
            return false;
        }
        self.status = TimerStatus::Active;
        true
    }

    /// Stop without completing. Returns false once already terminal.
    pub fn stop(&mut self) -> bool {
        match self.status {
            TimerStatus::Intro | TimerStatus::Active => {
                self.status = TimerStatus::Stopped;
                true
            }
            TimerStatus::Complete | TimerStatus::Stopped => false,
        }
    }

    /// Apply one elapsed second.
    ///
    /// Returns the boundary event this tick crossed, if any: a phase advance,
    /// a finished cycle, or the end of the session.
    pub fn tick(&mut self) -> Option<Event> {
        if self.status != TimerStatus::Active {
            return None;
        }

        let duration = self.current_duration();
        self.ticks += 1;
        self.elapsed_in_phase += 1;
        self.elapsed_in_cycle += 1;

        if self.elapsed_in_phase < duration {
            return None;
        }

        if self.phase_index + 1 < self.cycle.len() {
            self.phase_index += 1;
            self.elapsed_in_phase = 0;
            let phase = self.current_phase()?;
            return Some(Event::PhaseAdvanced {
                cycle: self.current_cycle,
                phase_index: self.phase_index,
                phase: phase.name,
                label: phase.label.clone(),
                duration_secs: phase.duration_secs,
                at: Utc::now(),
            });
        }

        let finished = self.current_cycle;
        if finished >= self.total_cycles {
            // Hold the final state: last phase full, cycle at 100%.
            self.status = TimerStatus::Complete;
            return Some(Event::SessionCompleted {
                cycles: finished,
                elapsed_secs: self.ticks,
                at: Utc::now(),
            });
        }

        let cycle_progress_pct = self.cycle_progress_pct();
        self.current_cycle += 1;
        self.phase_index = 0;
        self.elapsed_in_phase = 0;
        self.elapsed_in_cycle = 0;
        Some(Event::CycleCompleted {
            cycle: finished,
            cycle_progress_pct,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technique::flatten;

    fn active(technique: &str, cycles: u32) -> CycleTimer {
        let mut timer = CycleTimer::new(flatten(technique), cycles).unwrap();
        assert!(timer.start());
        timer
    }

    #[test]
    fn zero_cycles_rejected() {
        assert_eq!(
            CycleTimer::new(flatten("box"), 0).unwrap_err(),
            ValidationError::ZeroCycles
        );
    }

    #[test]
    fn ticks_ignored_before_start() {
        let mut timer = CycleTimer::new(flatten("box"), 3).unwrap();
        assert_eq!(timer.status(), TimerStatus::Intro);
        assert!(timer.tick().is_none());
        assert_eq!(timer.ticks(), 0);
        assert_eq!(timer.elapsed_in_phase(), 0);
    }

    #[test]
    fn four_seven_eight_completes_after_57_ticks() {
        let mut timer = active("4-7-8", 3);
        let mut ticks = 0;
        while timer.status() == TimerStatus::Active {
            timer.tick();
            ticks += 1;
            assert!(ticks <= 57, "still active after {ticks} ticks");
        }
        assert_eq!(ticks, 57);
        assert_eq!(timer.status(), TimerStatus::Complete);
        assert_eq!(timer.current_cycle(), 3);
        assert_eq!(timer.phase_index(), 2);
        assert_eq!(timer.phase_progress_pct(), 100.0);
        assert_eq!(timer.cycle_progress_pct(), 100.0);
    }

    #[test]
    fn phase_advance_resets_phase_progress() {
        let mut timer = active("4-7-8", 1);
        for _ in 0..3 {
            assert!(timer.tick().is_none());
        }
        assert_eq!(timer.phase_progress_pct(), 75.0);
        assert_eq!(timer.seconds_remaining(), 1);

        match timer.tick() {
            Some(Event::PhaseAdvanced {
                phase_index, phase, ..
            }) => {
                assert_eq!(phase_index, 1);
                assert_eq!(phase, PhaseKind::Hold);
            }
            other => panic!("expected PhaseAdvanced, got {other:?}"),
        }
        assert_eq!(timer.phase_progress_pct(), 0.0);
        assert_eq!(timer.seconds_remaining(), 7);
    }

    #[test]
    fn cycle_boundary_reports_full_progress_then_resets() {
        let mut timer = active("coherent", 2);
        let mut boundary = None;
        for _ in 0..10 {
            if let Some(event) = timer.tick() {
                boundary = Some(event);
            }
        }
        match boundary {
            Some(Event::CycleCompleted {
                cycle,
                cycle_progress_pct,
                ..
            }) => {
                assert_eq!(cycle, 1);
                assert_eq!(cycle_progress_pct, 100.0);
            }
            other => panic!("expected CycleCompleted, got {other:?}"),
        }
        assert_eq!(timer.current_cycle(), 2);
        assert_eq!(timer.phase_index(), 0);
        assert_eq!(timer.cycle_progress_pct(), 0.0);
    }

    #[test]
    fn cycle_progress_below_100_until_cycle_ends() {
        let mut timer = active("box", 3);
        while timer.is_active() {
            let event = timer.tick();
            let completed_now = matches!(
                event,
                Some(Event::CycleCompleted { .. }) | Some(Event::SessionCompleted { .. })
            );
            if !completed_now {
                assert!(timer.cycle_progress_pct() < 100.0);
            }
        }
    }

    #[test]
    fn stop_freezes_state() {
        let mut timer = active("box", 3);
        timer.tick();
        timer.tick();
        assert!(timer.stop());
        let before = timer.snapshot();
        for _ in 0..20 {
            assert!(timer.tick().is_none());
        }
        assert_eq!(timer.snapshot(), before);
        assert_eq!(timer.status(), TimerStatus::Stopped);
        assert!(!timer.stop());
    }

    #[test]
    fn complete_ignores_further_ticks() {
        let mut timer = active("coherent", 1);
        for _ in 0..10 {
            timer.tick();
        }
        assert_eq!(timer.status(), TimerStatus::Complete);
        let held = timer.snapshot();
        assert!(timer.tick().is_none());
        assert_eq!(timer.snapshot(), held);
        assert!(!timer.stop());
    }

    #[test]
    fn snapshot_reports_current_phase() {
        let mut timer = active("pursed-lip", 3);
        timer.tick();
        timer.tick();
        let snap = timer.snapshot();
        assert_eq!(snap.phase, PhaseKind::Exhale);
        assert_eq!(snap.label, "Breathe out through pursed lips");
        assert_eq!(snap.seconds_remaining, 4);
        assert_eq!(snap.cycle, 1);
        assert_eq!(snap.total_cycles, 3);
        assert!((snap.cycle_progress_pct - 100.0 / 3.0).abs() < 1e-9);
    }
}
