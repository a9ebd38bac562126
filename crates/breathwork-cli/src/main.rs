use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "breathwork", version, about = "Guided breathing from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a breathing session
    Breathe(commands::breathe::BreatheArgs),
    /// Browse breathing techniques
    Technique {
        #[command(subcommand)]
        action: commands::technique::TechniqueAction,
    },
    /// Print the breathing guide for a technique
    Wave(commands::wave::WaveArgs),
    /// Quotes for a mood
    Quote {
        #[command(subcommand)]
        action: commands::quote::QuoteAction,
    },
    /// Check-in prompts for reaching out to someone
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckInAction,
    },
    /// Do-good tally
    Dogood {
        #[command(subcommand)]
        action: commands::dogood::DoGoodAction,
    },
    /// Premium prompt frequency
    Premium {
        #[command(subcommand)]
        action: commands::premium::PremiumAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Breathe(args) => commands::breathe::run(args),
        Commands::Technique { action } => commands::technique::run(action),
        Commands::Wave(args) => commands::wave::run(args),
        Commands::Quote { action } => commands::quote::run(action),
        Commands::Checkin { action } => commands::checkin::run(action),
        Commands::Dogood { action } => commands::dogood::run(action),
        Commands::Premium { action } => commands::premium::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "breathwork", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
