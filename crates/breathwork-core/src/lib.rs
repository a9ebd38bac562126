//! # Breathwork Core Library
//!
//! This library provides the core logic for guided breathing sessions.
//! Every operation is available through the standalone `breathwork` CLI,
//! which is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Techniques**: A static table of breathing techniques and the flattener
//!   that unrolls repeated phases into one cycle
//! - **Timer**: A tick-driven state machine; the caller (or [`SessionRunner`])
//!   invokes `tick()` once per second
//! - **Wave**: Pure geometry for the breathing guide and its indicator
//! - **Session**: Intro / active / completion screens and the mood handoff
//! - **Check-in**: Per-mood social prompts that count toward the do-good tally
//! - **Storage**: SQLite session history and key-value state, TOML configuration
//!
//! ## Key Components
//!
//! - [`CycleTimer`]: Phase and cycle state machine
//! - [`BreathingSession`]: Screen-level controller around the timer
//! - [`SessionRunner`]: Owns the tick and completion-hold scheduling
//! - [`Database`]: Session and statistics persistence
//! - [`Config`]: Application configuration management

pub mod checkin;
pub mod counters;
pub mod error;
pub mod events;
pub mod mood;
pub mod quotes;
pub mod runner;
pub mod session;
pub mod storage;
pub mod technique;
pub mod timer;
pub mod wave;

pub use checkin::CheckInPrompt;
pub use counters::{Clock, CounterStore, DoGoodTally, ManualClock, PromptFrequency, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use mood::Mood;
pub use quotes::{Quote, SavedQuote, SavedQuotes};
pub use runner::SessionRunner;
pub use session::{BreathingSession, ExitReason, Frame, Handoff, Screen, SessionRequest};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, Preferences, Stats};
pub use technique::{FlattenedCycle, Phase, PhaseIcon, PhaseKind, Technique};
pub use timer::{CycleTimer, TickDriver, TickHandle, TickSnapshot, TimerStatus};
pub use wave::WavePoint;
