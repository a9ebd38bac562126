//! Breathing techniques: the static phase table and its flattened,
//! repeat-expanded form.

mod flatten;
mod table;

pub use flatten::{flatten, FlattenedCycle};
pub use table::{find, resolve, techniques, DEFAULT_TECHNIQUE_ID};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of phase names a technique can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    Inhale,
    Hold,
    Exhale,
    RapidInhale,
    RapidExhale,
    Retention,
    Recovery,
    DoubleInhale,
    Hold2,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 9] = [
        PhaseKind::Inhale,
        PhaseKind::Hold,
        PhaseKind::Exhale,
        PhaseKind::RapidInhale,
        PhaseKind::RapidExhale,
        PhaseKind::Retention,
        PhaseKind::Recovery,
        PhaseKind::DoubleInhale,
        PhaseKind::Hold2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Inhale => "inhale",
            PhaseKind::Hold => "hold",
            PhaseKind::Exhale => "exhale",
            PhaseKind::RapidInhale => "rapid-inhale",
            PhaseKind::RapidExhale => "rapid-exhale",
            PhaseKind::Retention => "retention",
            PhaseKind::Recovery => "recovery",
            PhaseKind::DoubleInhale => "double-inhale",
            PhaseKind::Hold2 => "hold2",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhaseKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown phase name: {s}"))
    }
}

/// One entry of the build-time phase table.
///
/// `repeat_count` is a declarative hint: consecutive specs sharing the same
/// count form a group that [`flatten`] unrolls. The timer never sees it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PhaseSpec {
    pub name: PhaseKind,
    pub duration_secs: u32,
    pub label: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_pursed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u32>,
}

impl PhaseSpec {
    const fn new(name: PhaseKind, duration_secs: u32, label: &'static str) -> Self {
        Self {
            name,
            duration_secs,
            label,
            is_pursed: false,
            repeat_count: None,
        }
    }

    const fn pursed(mut self) -> Self {
        self.is_pursed = true;
        self
    }

    const fn repeated(mut self, count: u32) -> Self {
        self.repeat_count = Some(count);
        self
    }
}

/// A concrete phase of a flattened cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phase {
    pub name: PhaseKind,
    pub duration_secs: u32,
    pub label: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_pursed: bool,
}

impl Phase {
    pub fn icon(&self) -> PhaseIcon {
        PhaseIcon::for_phase(self.name, self.is_pursed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueIcon {
    Square,
    Moon,
    Wind,
    Snowflake,
    Leaf,
    Wave,
}

/// Glyph shown next to the live phase label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseIcon {
    BreatheIn,
    BreatheOut,
    PursedLips,
    Pause,
}

impl PhaseIcon {
    pub fn for_phase(kind: PhaseKind, is_pursed: bool) -> Self {
        match kind {
            PhaseKind::Inhale
            | PhaseKind::RapidInhale
            | PhaseKind::Recovery
            | PhaseKind::DoubleInhale => PhaseIcon::BreatheIn,
            PhaseKind::Exhale | PhaseKind::RapidExhale if is_pursed => PhaseIcon::PursedLips,
            PhaseKind::Exhale | PhaseKind::RapidExhale => PhaseIcon::BreatheOut,
            PhaseKind::Hold | PhaseKind::Retention | PhaseKind::Hold2 => PhaseIcon::Pause,
        }
    }
}

/// Static descriptor of a breathing technique.
#[derive(Debug, Serialize)]
pub struct Technique {
    pub id: &'static str,
    pub name: &'static str,
    pub headline: &'static str,
    pub attribution: &'static str,
    pub icon: TechniqueIcon,
    pub phases: &'static [PhaseSpec],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names_use_kebab_case() {
        let json = serde_json::to_string(&PhaseKind::DoubleInhale).unwrap();
        assert_eq!(json, "\"double-inhale\"");
        let json = serde_json::to_string(&PhaseKind::Hold2).unwrap();
        assert_eq!(json, "\"hold2\"");
    }

    #[test]
    fn phase_kind_parses_every_name() {
        for kind in PhaseKind::ALL {
            assert_eq!(kind.as_str().parse::<PhaseKind>().unwrap(), kind);
        }
        assert!("sigh".parse::<PhaseKind>().is_err());
    }

    #[test]
    fn pursed_exhale_gets_lips_icon() {
        assert_eq!(PhaseIcon::for_phase(PhaseKind::Exhale, true), PhaseIcon::PursedLips);
        assert_eq!(PhaseIcon::for_phase(PhaseKind::Exhale, false), PhaseIcon::BreatheOut);
        // Pursed flag only matters on the way out.
        assert_eq!(PhaseIcon::for_phase(PhaseKind::Inhale, true), PhaseIcon::BreatheIn);
        assert_eq!(PhaseIcon::for_phase(PhaseKind::Hold2, false), PhaseIcon::Pause);
    }
}
