use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::Handoff;
use crate::technique::PhaseKind;
use crate::timer::TickSnapshot;

/// Every state change of a breathing session produces an Event.
/// The front end renders from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Intro dismissed, ticking begins.
    SessionStarted {
        session_id: Uuid,
        technique_id: String,
        total_cycles: u32,
        cycle_secs: u32,
        at: DateTime<Utc>,
    },
    PhaseAdvanced {
        cycle: u32,
        phase_index: usize,
        phase: PhaseKind,
        label: String,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// A non-final cycle finished; the next one starts at phase 0.
    CycleCompleted {
        cycle: u32,
        cycle_progress_pct: f64,
        at: DateTime<Utc>,
    },
    /// Final cycle finished. Ticking stops and the completion screen shows.
    SessionCompleted {
        cycles: u32,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// User left before the final cycle finished.
    SessionSkipped {
        cycle: u32,
        phase_index: usize,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// Control returns to the caller with the mood it handed in.
    Exited {
        handoff: Handoff,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        snapshot: TickSnapshot,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_exit(&self) -> bool {
        matches!(self, Event::Exited { .. })
    }
}
