use clap::Args;
use serde::Serialize;

use breathwork_core::technique::{self, FlattenedCycle};
use breathwork_core::wave::{self, MAX_SAMPLES_PER_SECOND, WAVE_WIDTH};
use breathwork_core::WavePoint;

use super::{print_json, CliResult};

#[derive(Args)]
pub struct WaveArgs {
    /// Technique id
    id: String,
    /// Guide samples per second of cycle
    #[arg(
        long,
        default_value = "4",
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SAMPLES_PER_SECOND))
    )]
    samples_per_second: u32,
}

#[derive(Serialize)]
struct Guide {
    technique_id: &'static str,
    width: f64,
    cycle_secs: u32,
    path: String,
    points: Vec<WavePoint>,
}

pub fn run(args: WaveArgs) -> CliResult {
    let technique = technique::find(&args.id).ok_or_else(|| format!("unknown technique: {}", args.id))?;
    let cycle = FlattenedCycle::from_technique(technique);
    let points = wave::guide_path(&cycle, args.samples_per_second);
    print_json(&Guide {
        technique_id: cycle.technique_id(),
        width: WAVE_WIDTH,
        cycle_secs: cycle.total_secs(),
        path: wave::svg_path(&points),
        points,
    })
}
