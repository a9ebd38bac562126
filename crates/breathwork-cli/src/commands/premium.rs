use clap::Subcommand;
use serde_json::json;

use breathwork_core::{Config, CounterStore, SystemClock};

use super::{print_json, CliResult, Store};

#[derive(Subcommand)]
pub enum PremiumAction {
    /// Decide whether the upsell may be shown now, and count it if so
    Check,
}

pub fn run(action: PremiumAction) -> CliResult {
    match action {
        PremiumAction::Check => {
            let config = Config::load_or_default();
            let store = Store::open();
            let show = CounterStore::new(&store).take_prompt_slot(&SystemClock, &config.premium);
            print_json(&json!({ "show_prompt": show }))
        }
    }
}
