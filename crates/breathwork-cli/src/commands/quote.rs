use clap::Subcommand;

use breathwork_core::quotes::{self, SavedQuotes};
use breathwork_core::Mood;

use super::{print_json, CliResult, Store};

#[derive(Subcommand)]
pub enum QuoteAction {
    /// Print a random quote for a mood
    Random {
        #[arg(long, default_value = "stressed")]
        mood: Mood,
    },
    /// Save a quote from a mood's list
    Save {
        #[arg(long)]
        mood: Mood,
        /// Position in the mood's quote list
        index: usize,
    },
    /// List saved quotes
    Saved,
    /// Remove a saved quote
    Unsave {
        /// Position in the saved list
        index: usize,
    },
}

pub fn run(action: QuoteAction) -> CliResult {
    match action {
        QuoteAction::Random { mood } => {
            print_json(&quotes::pick(mood, &mut rand::thread_rng()))?;
        }
        QuoteAction::Save { mood, index } => {
            let pool = quotes::for_mood(mood);
            let quote = pool
                .get(index)
                .ok_or_else(|| format!("no quote {index} for {mood} (have {})", pool.len()))?;
            let store = Store::open();
            if SavedQuotes::new(&store).save(quote, mood)? {
                println!("saved");
            } else {
                println!("already saved");
            }
        }
        QuoteAction::Saved => {
            let store = Store::open();
            print_json(&SavedQuotes::new(&store).list())?;
        }
        QuoteAction::Unsave { index } => {
            let store = Store::open();
            let removed = SavedQuotes::new(&store).remove(index)?;
            println!("removed: {}", removed.text);
        }
    }
    Ok(())
}
