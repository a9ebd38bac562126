//! Wave position function.
//!
//! Maps a phase and its progress to a vertical coordinate on the breathing
//! wave (SVG convention: y grows downward, so the peak has the smallest y).
//! The static guide path and the live indicator are both produced by
//! [`position`]; nothing else computes wave coordinates.

use serde::Serialize;
use std::f64::consts::PI;
use std::fmt::Write;

use crate::technique::{FlattenedCycle, PhaseKind};

pub const WAVE_CENTER: f64 = 100.0;
pub const WAVE_AMPLITUDE: f64 = 60.0;
pub const WAVE_PEAK: f64 = WAVE_CENTER - WAVE_AMPLITUDE;
pub const WAVE_TROUGH: f64 = WAVE_CENTER + WAVE_AMPLITUDE;
/// Extra rise of a double inhale above the regular peak.
pub const DOUBLE_INHALE_RISE: f64 = WAVE_AMPLITUDE / 4.0;
pub const WAVE_SECONDARY_PEAK: f64 = WAVE_PEAK - DOUBLE_INHALE_RISE;
/// Horizontal extent of one full cycle.
pub const WAVE_WIDTH: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WavePoint {
    pub x: f64,
    pub y: f64,
}

/// Vertical position for `kind` at `progress_pct` (0..=100, clamped).
pub fn wave_y(kind: PhaseKind, progress_pct: f64) -> f64 {
    let p = if progress_pct.is_nan() {
        0.0
    } else {
        progress_pct.clamp(0.0, 100.0) / 100.0
    };

    match kind {
        PhaseKind::Inhale | PhaseKind::RapidInhale | PhaseKind::Recovery => {
            WAVE_CENTER - WAVE_AMPLITUDE * (p * PI / 2.0).sin()
        }
        // Anchored at the end of the preceding inhale, not at the center.
        PhaseKind::DoubleInhale => WAVE_PEAK - DOUBLE_INHALE_RISE * (p * PI / 2.0).sin(),
        PhaseKind::Exhale | PhaseKind::RapidExhale => WAVE_CENTER - WAVE_AMPLITUDE * (p * PI).cos(),
        PhaseKind::Hold => WAVE_PEAK,
        PhaseKind::Retention | PhaseKind::Hold2 => WAVE_TROUGH,
    }
}

/// Same as [`wave_y`] for a raw phase name; unknown names sit on the center line.
pub fn wave_y_for_name(name: &str, progress_pct: f64) -> f64 {
    name.parse::<PhaseKind>()
        .map_or(WAVE_CENTER, |kind| wave_y(kind, progress_pct))
}

/// Point on the wave for phase `index` of `cycle` at `progress_pct`.
///
/// Used both for the live indicator and, through [`guide_path`], for the
/// static guide curve.
pub fn position(cycle: &FlattenedCycle, index: usize, progress_pct: f64) -> WavePoint {
    let Some(phase) = cycle.phase(index) else {
        return WavePoint {
            x: 0.0,
            y: WAVE_CENTER,
        };
    };
    let fraction = if progress_pct.is_nan() {
        0.0
    } else {
        progress_pct.clamp(0.0, 100.0) / 100.0
    };
    let secs = f64::from(cycle.offset_secs(index)) + fraction * f64::from(phase.duration_secs);
    let total = f64::from(cycle.total_secs().max(1));

    WavePoint {
        x: secs / total * WAVE_WIDTH,
        y: wave_y(phase.name, progress_pct),
    }
}

/// Point on the wave `secs` seconds into the cycle.
pub fn point_at(cycle: &FlattenedCycle, secs: f64) -> WavePoint {
    let (index, in_phase) = cycle.locate(secs);
    let duration = cycle
        .phase(index)
        .map_or(1.0, |p| f64::from(p.duration_secs));
    position(cycle, index, in_phase / duration * 100.0)
}

/// Highest sampling rate `guide_path` honours; larger requests are clamped.
pub const MAX_SAMPLES_PER_SECOND: u32 = 100;

/// Guide path sampled `samples_per_second` times per second across the
/// whole cycle, both endpoints included. The rate is clamped to
/// `1..=MAX_SAMPLES_PER_SECOND`.
pub fn guide_path(cycle: &FlattenedCycle, samples_per_second: u32) -> Vec<WavePoint> {
    let rate = samples_per_second.clamp(1, MAX_SAMPLES_PER_SECOND);
    let count = cycle.total_secs().saturating_mul(rate);
    (0..=count)
        .map(|k| point_at(cycle, f64::from(k) / f64::from(rate)))
        .collect()
}

/// Render points as an SVG path `d` attribute.
pub fn svg_path(points: &[WavePoint]) -> String {
    let mut d = String::with_capacity(points.len() * 16);
    for (i, point) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{:.2},{:.2} ", point.x, point.y);
    }
    d.truncate(d.trim_end().len());
    d
}
