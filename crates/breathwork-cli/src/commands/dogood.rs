use clap::Subcommand;
use serde_json::json;

use breathwork_core::{Config, CounterStore, SystemClock};
use breathwork_core::counters::Clock;

use super::{print_json, CliResult, Store};

#[derive(Subcommand)]
pub enum DoGoodAction {
    /// Count one good deed
    Done,
    /// Print the current tally
    Status,
}

pub fn run(action: DoGoodAction) -> CliResult {
    let config = Config::load_or_default();
    let store = Store::open();
    let counters = CounterStore::new(&store);

    let count = match action {
        DoGoodAction::Done => counters.record_do_good(&SystemClock, &config.do_good),
        DoGoodAction::Status => counters.do_good().current(SystemClock.now(), &config.do_good),
    };
    print_json(&json!({ "count": count }))
}
