//! Built-in technique table.
//!
//! The first entry is the fallback for unknown identifiers.

use super::{PhaseKind, PhaseSpec, Technique, TechniqueIcon};

pub const DEFAULT_TECHNIQUE_ID: &str = "box";

/// Rapid breaths per Wim Hof round.
const WIM_HOF_ROUNDS: u32 = 10;

static TECHNIQUES: &[Technique] = &[
    Technique {
        id: "box",
        name: "Box Breathing",
        headline: "Square up and steady your mind",
        attribution: "Used by first responders to stay calm under pressure",
        icon: TechniqueIcon::Square,
        phases: &[
            PhaseSpec::new(PhaseKind::Inhale, 4, "Breathe in"),
            PhaseSpec::new(PhaseKind::Hold, 4, "Hold"),
            PhaseSpec::new(PhaseKind::Exhale, 4, "Breathe out"),
            PhaseSpec::new(PhaseKind::Hold2, 4, "Hold"),
        ],
    },
    Technique {
        id: "4-7-8",
        name: "4-7-8 Breathing",
        headline: "A natural tranquilizer for the nervous system",
        attribution: "Popularized by Dr. Andrew Weil",
        icon: TechniqueIcon::Moon,
        phases: &[
            PhaseSpec::new(PhaseKind::Inhale, 4, "Breathe in"),
            PhaseSpec::new(PhaseKind::Hold, 7, "Hold"),
            PhaseSpec::new(PhaseKind::Exhale, 8, "Breathe out"),
        ],
    },
    Technique {
        id: "physiological-sigh",
        name: "Physiological Sigh",
        headline: "The fastest way to calm down in real time",
        attribution: "Studied at Stanford as cyclic sighing",
        icon: TechniqueIcon::Wind,
        phases: &[
            PhaseSpec::new(PhaseKind::Inhale, 2, "Breathe in"),
            PhaseSpec::new(PhaseKind::DoubleInhale, 1, "Sip in a little more"),
            PhaseSpec::new(PhaseKind::Exhale, 6, "Long breath out"),
        ],
    },
    Technique {
        id: "wim-hof",
        name: "Wim Hof Breathing",
        headline: "Energize body and mind",
        attribution: "Based on the Wim Hof Method, closing each round with a 15 s recovery hold",
        icon: TechniqueIcon::Snowflake,
        phases: &[
            PhaseSpec::new(PhaseKind::RapidInhale, 1, "Breathe in").repeated(WIM_HOF_ROUNDS),
            PhaseSpec::new(PhaseKind::RapidExhale, 1, "Let go").repeated(WIM_HOF_ROUNDS),
            PhaseSpec::new(PhaseKind::Retention, 10, "Hold on empty"),
            PhaseSpec::new(PhaseKind::Recovery, 3, "Recovery breath"),
            PhaseSpec::new(PhaseKind::Hold, 15, "Hold the recovery breath"),
        ],
    },
    Technique {
        id: "pursed-lip",
        name: "Pursed-Lip Breathing",
        headline: "Slow your breath, ease breathlessness",
        attribution: "Recommended in pulmonary rehabilitation",
        icon: TechniqueIcon::Leaf,
        phases: &[
            PhaseSpec::new(PhaseKind::Inhale, 2, "Breathe in through your nose"),
            PhaseSpec::new(PhaseKind::Exhale, 4, "Breathe out through pursed lips").pursed(),
        ],
    },
    Technique {
        id: "coherent",
        name: "Coherent Breathing",
        headline: "Find your resonant rhythm",
        attribution: "Five breaths a minute, after Stephen Elliott",
        icon: TechniqueIcon::Wave,
        phases: &[
            PhaseSpec::new(PhaseKind::Inhale, 5, "Breathe in"),
            PhaseSpec::new(PhaseKind::Exhale, 5, "Breathe out"),
        ],
    },
];

pub fn techniques() -> &'static [Technique] {
    TECHNIQUES
}

pub fn find(id: &str) -> Option<&'static Technique> {
    TECHNIQUES.iter().find(|t| t.id == id)
}

/// Look up a technique, falling back to the first table entry.
pub fn resolve(id: &str) -> &'static Technique {
    find(id).unwrap_or(&TECHNIQUES[0])
}
