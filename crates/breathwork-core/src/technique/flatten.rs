use serde::Serialize;

use super::table::resolve;
use super::{Phase, PhaseSpec, Technique};

/// One traversal of a technique with every repeat group unrolled.
///
/// Built once per technique selection and never mutated; `total_secs` is the
/// cycle-progress denominator for this technique only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenedCycle {
    technique_id: &'static str,
    phases: Vec<Phase>,
    total_secs: u32,
}

/// Flatten the technique named by `technique_id`, or the default technique
/// when the id is unknown.
pub fn flatten(technique_id: &str) -> FlattenedCycle {
    FlattenedCycle::from_technique(resolve(technique_id))
}

impl FlattenedCycle {
    pub fn from_technique(technique: &'static Technique) -> Self {
        let specs = technique.phases;
        let mut phases = Vec::with_capacity(specs.len());
        let mut i = 0;

        while i < specs.len() {
            match specs[i].repeat_count {
                Some(count) if count > 1 => {
                    let end = specs[i..]
                        .iter()
                        .position(|s| s.repeat_count != Some(count))
                        .map_or(specs.len(), |off| i + off);
                    for n in 1..=count {
                        phases.extend(specs[i..end].iter().map(|spec| {
                            Phase {
                                label: format!("Breath {n}"),
                                ..concrete(spec)
                            }
                        }));
                    }
                    i = end;
                }
                _ => {
                    phases.push(concrete(&specs[i]));
                    i += 1;
                }
            }
        }

        let total_secs = phases.iter().map(|p| p.duration_secs).sum();
        Self {
            technique_id: technique.id,
            phases,
            total_secs,
        }
    }

    pub fn technique_id(&self) -> &'static str {
        self.technique_id
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Sum of all phase durations in seconds.
    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    /// Seconds elapsed in the cycle before phase `index` starts.
    pub fn offset_secs(&self, index: usize) -> u32 {
        self.phases
            .iter()
            .take(index)
            .map(|p| p.duration_secs)
            .sum()
    }

    /// Index of the phase active at `secs` into the cycle, and the seconds
    /// already spent in it. Past the end, the last phase is reported as full.
    pub fn locate(&self, secs: f64) -> (usize, f64) {
        let mut start = 0.0;
        for (index, phase) in self.phases.iter().enumerate() {
            let end = start + f64::from(phase.duration_secs);
            if secs < end {
                return (index, (secs - start).max(0.0));
            }
            start = end;
        }
        let last = self.phases.len().saturating_sub(1);
        let last_duration = self.phases.last().map_or(0.0, |p| f64::from(p.duration_secs));
        (last, last_duration)
    }
}

fn concrete(spec: &PhaseSpec) -> Phase {
    Phase {
        name: spec.name,
        duration_secs: spec.duration_secs.max(1),
        label: spec.label.to_string(),
        is_pursed: spec.is_pursed,
    }
}
