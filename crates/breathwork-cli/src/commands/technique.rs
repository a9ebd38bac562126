use clap::Subcommand;
use serde::Serialize;

use breathwork_core::technique::{self, FlattenedCycle, Technique, TechniqueIcon};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum TechniqueAction {
    /// List all techniques
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a technique and its flattened cycle
    Show {
        /// Technique id (e.g. "box", "4-7-8")
        id: String,
    },
}

#[derive(Serialize)]
struct Summary {
    id: &'static str,
    name: &'static str,
    headline: &'static str,
    attribution: &'static str,
    icon: TechniqueIcon,
    cycle_secs: u32,
}

impl From<&'static Technique> for Summary {
    fn from(t: &'static Technique) -> Self {
        Self {
            id: t.id,
            name: t.name,
            headline: t.headline,
            attribution: t.attribution,
            icon: t.icon,
            cycle_secs: FlattenedCycle::from_technique(t).total_secs(),
        }
    }
}

#[derive(Serialize)]
struct Detail {
    technique: &'static Technique,
    cycle: FlattenedCycle,
}

pub fn run(action: TechniqueAction) -> CliResult {
    match action {
        TechniqueAction::List { json } => {
            let summaries: Vec<Summary> = technique::techniques().iter().map(Summary::from).collect();
            if json {
                print_json(&summaries)?;
            } else {
                for s in &summaries {
                    println!("{:<20} {:>3}s  {}", s.id, s.cycle_secs, s.name);
                }
            }
        }
        TechniqueAction::Show { id } => {
            let technique = technique::find(&id).ok_or_else(|| format!("unknown technique: {id}"))?;
            print_json(&Detail {
                technique,
                cycle: FlattenedCycle::from_technique(technique),
            })?;
        }
    }
    Ok(())
}
