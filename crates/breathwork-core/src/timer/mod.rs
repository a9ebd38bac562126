mod driver;
mod engine;

pub use driver::{TickControl, TickDriver, TickHandle};
pub use engine::{CycleTimer, TickSnapshot, TimerStatus, DEFAULT_CYCLES};
