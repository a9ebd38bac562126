//! Breathing session: the screen-level controller around a [`CycleTimer`].
//!
//! Owns the intro / active / completion sub-screens, the wave indicator and
//! phase icon for each frame, and the handoff back to the caller. It holds
//! no scheduling resources; see [`SessionRunner`](crate::runner::SessionRunner).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::events::Event;
use crate::mood::Mood;
use crate::storage::{KeyValueStore, Preferences};
use crate::technique::{self, FlattenedCycle, PhaseIcon, Technique};
use crate::timer::{CycleTimer, TickSnapshot, TimerStatus, DEFAULT_CYCLES};
use crate::wave::{self, WavePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Intro,
    Active,
    Completion,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitReason {
    Completed,
    Skipped,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Completed => "completed",
            ExitReason::Skipped => "skipped",
        }
    }
}

/// What the caller gets back when the session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handoff {
    pub mood: Mood,
    pub reason: ExitReason,
}

/// What the caller hands in to start a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    /// `None` picks the remembered technique.
    pub technique_id: Option<String>,
    pub mood: Mood,
    pub cycles: u32,
}

impl SessionRequest {
    pub fn new(mood: Mood) -> Self {
        Self {
            technique_id: None,
            mood,
            cycles: DEFAULT_CYCLES,
        }
    }

    pub fn technique(mut self, id: impl Into<String>) -> Self {
        self.technique_id = Some(id.into());
        self
    }

    pub fn cycles(mut self, cycles: u32) -> Self {
        self.cycles = cycles;
        self
    }
}

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub screen: Screen,
    pub snapshot: TickSnapshot,
    pub indicator: WavePoint,
    pub icon: PhaseIcon,
}

#[derive(Debug, Clone)]
pub struct BreathingSession {
    id: Uuid,
    technique: &'static Technique,
    mood: Mood,
    timer: CycleTimer,
    screen: Screen,
    started_at: Option<DateTime<Utc>>,
}

impl BreathingSession {
    /// # Errors
    /// Returns [`ValidationError::ZeroCycles`] when `cycles` is 0.
    pub fn new(
        technique: &'static Technique,
        mood: Mood,
        cycles: u32,
    ) -> Result<Self, ValidationError> {
        let flattened = FlattenedCycle::from_technique(technique);
        Ok(Self {
            id: Uuid::new_v4(),
            technique,
            mood,
            timer: CycleTimer::new(flattened, cycles)?,
            screen: Screen::Intro,
            started_at: None,
        })
    }

    /// Resolve the request against the table and the remembered choice.
    ///
    /// An explicit technique is remembered for next time; an unknown id
    /// resolves to the default technique.
    pub fn from_request<S: KeyValueStore + ?Sized>(
        request: &SessionRequest,
        preferences: &Preferences<'_, S>,
    ) -> Result<Self, ValidationError> {
        let technique = match request.technique_id.as_deref() {
            Some(id) => {
                let technique = technique::resolve(id);
                if technique.id != id {
                    tracing::debug!(requested = id, using = technique.id, "unknown technique");
                }
                preferences.remember_technique(technique.id);
                technique
            }
            None => technique::resolve(preferences.last_technique()),
        };
        Self::new(technique, request.mood, request.cycles)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn technique(&self) -> &'static Technique {
        self.technique
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn timer(&self) -> &CycleTimer {
        &self.timer
    }

    pub fn flattened(&self) -> &FlattenedCycle {
        self.timer.flattened()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Seconds of breathing done so far.
    pub fn elapsed_secs(&self) -> u64 {
        self.timer.ticks()
    }

    /// Cycles fully breathed through.
    pub fn cycles_completed(&self) -> u32 {
        match self.timer.status() {
            TimerStatus::Complete => self.timer.total_cycles(),
            _ => self.timer.current_cycle() - 1,
        }
    }

    pub fn snapshot(&self) -> TickSnapshot {
        self.timer.snapshot()
    }

    pub fn frame(&self) -> Frame {
        let snapshot = self.timer.snapshot();
        let indicator = wave::position(
            self.flattened(),
            snapshot.phase_index,
            snapshot.phase_progress_pct,
        );
        let icon = self
            .timer
            .current_phase()
            .map_or(PhaseIcon::BreatheIn, |p| p.icon());
        Frame {
            screen: self.screen,
            snapshot,
            indicator,
            icon,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Dismiss the intro and start the timer.
    pub fn begin(&mut self) -> Option<Event> {
        if self.screen != Screen::Intro || !self.timer.start() {
            return None;
        }
        self.screen = Screen::Active;
        let now = Utc::now();
        self.started_at = Some(now);
        tracing::debug!(session = %self.id, technique = self.technique.id, "session started");
        Some(Event::SessionStarted {
            session_id: self.id,
            technique_id: self.technique.id.to_string(),
            total_cycles: self.timer.total_cycles(),
            cycle_secs: self.flattened().total_secs(),
            at: now,
        })
    }

    /// Apply one elapsed second. A no-op outside the active screen.
    pub fn tick(&mut self) -> Option<Event> {
        if self.screen != Screen::Active {
            return None;
        }
        let event = self.timer.tick();
        if self.timer.status() == TimerStatus::Complete {
            self.screen = Screen::Completion;
            tracing::debug!(session = %self.id, "session complete");
        }
        event
    }

    /// Leave early. From the completion screen this is an ordinary exit.
    pub fn skip(&mut self) -> Option<Handoff> {
        match self.screen {
            Screen::Intro | Screen::Active => {
                self.timer.stop();
                self.screen = Screen::Exited;
                tracing::debug!(session = %self.id, elapsed = self.timer.ticks(), "session skipped");
                Some(Handoff {
                    mood: self.mood,
                    reason: ExitReason::Skipped,
                })
            }
            Screen::Completion => self.finish(),
            Screen::Exited => None,
        }
    }

    /// Leave the completion screen.
    pub fn finish(&mut self) -> Option<Handoff> {
        if self.screen != Screen::Completion {
            return None;
        }
        self.screen = Screen::Exited;
        Some(Handoff {
            mood: self.mood,
            reason: ExitReason::Completed,
        })
    }
}
