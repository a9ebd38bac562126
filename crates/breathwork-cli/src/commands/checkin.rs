use clap::Subcommand;
use serde::Serialize;
use serde_json::json;

use breathwork_core::checkin;
use breathwork_core::{CheckInPrompt, Config, CounterStore, Mood, SystemClock};

use super::{print_json, CliResult, Store};

#[derive(Subcommand)]
pub enum CheckInAction {
    /// Suggest a check-in for a mood
    Prompt {
        #[arg(long, default_value = "stressed")]
        mood: Mood,
        /// List every prompt for the mood instead of picking one
        #[arg(long)]
        all: bool,
    },
    /// Mark a check-in as done (counts as a good deed)
    Done,
}

#[derive(Serialize)]
struct Suggestion {
    mood: Mood,
    #[serde(flatten)]
    prompt: CheckInPrompt,
}

pub fn run(action: CheckInAction) -> CliResult {
    match action {
        CheckInAction::Prompt { mood, all: true } => print_json(checkin::for_mood(mood)),
        CheckInAction::Prompt { mood, all: false } => {
            let prompt = checkin::pick(mood, &mut rand::thread_rng());
            print_json(&Suggestion { mood, prompt })
        }
        CheckInAction::Done => {
            let config = Config::load_or_default();
            let store = Store::open();
            let count = checkin::complete(&CounterStore::new(&store), &SystemClock, &config.do_good);
            print_json(&json!({ "count": count }))
        }
    }
}
