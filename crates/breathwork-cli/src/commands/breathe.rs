use std::io::Write;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use breathwork_core::quotes::{self, Quote};
use breathwork_core::storage::SessionConfig;
use breathwork_core::wave::{WAVE_SECONDARY_PEAK, WAVE_TROUGH};
use breathwork_core::{
    BreathingSession, Config, Event, Frame, Handoff, Mood, PhaseIcon, Preferences, SessionRequest,
    SessionRunner, TickDriver,
};

use super::{print_json, CliResult, Store};

const BAR_WIDTH: usize = 24;

#[derive(Args)]
pub struct BreatheArgs {
    /// Technique id (defaults to the last one used, then to the mood's suggestion)
    #[arg(long)]
    technique: Option<String>,
    /// How you feel right now
    #[arg(long)]
    mood: Option<Mood>,
    /// Number of cycles
    #[arg(long)]
    cycles: Option<u32>,
    /// Start breathing without waiting for Enter
    #[arg(long)]
    no_intro: bool,
}

#[derive(Serialize)]
struct Summary {
    handoff: Handoff,
    technique_id: &'static str,
    cycles_completed: u32,
    elapsed_secs: u64,
    quote: Quote,
    #[serde(skip)]
    started_at: Option<DateTime<Utc>>,
}

pub fn run(args: BreatheArgs) -> CliResult {
    let config = Config::load_or_default();
    let store = Store::open();
    let fallback = match args.mood {
        Some(mood) => mood.suggested_technique(),
        None => config.session.default_technique.as_str(),
    };
    let preferences = Preferences::new(&store).with_fallback(fallback);

    let mood = args.mood.unwrap_or_default();
    let mut request = SessionRequest::new(mood).cycles(args.cycles.unwrap_or(config.session.cycles));
    if let Some(id) = args.technique {
        request = request.technique(id);
    }
    let session = BreathingSession::from_request(&request, &preferences)?;

    intro(&session, !args.no_intro)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let Some(summary) = runtime.block_on(play(session, &config.session)) else {
        return Err("session ended without a handoff".into());
    };

    if let Some(db) = store.database() {
        let ended_at = Utc::now();
        let started_at = summary.started_at.unwrap_or(ended_at);
        db.record_session(
            summary.technique_id,
            summary.handoff.mood,
            summary.cycles_completed,
            summary.handoff.reason,
            summary.elapsed_secs,
            started_at,
            ended_at,
        )?;
    }
    print_json(&summary)
}

fn intro(session: &BreathingSession, wait: bool) -> CliResult {
    let technique = session.technique();
    let mut err = std::io::stderr();
    writeln!(err, "{}", technique.name)?;
    writeln!(err, "{}", technique.headline)?;
    writeln!(err, "  {}", technique.attribution)?;
    writeln!(
        err,
        "{} cycles of {}s",
        session.timer().total_cycles(),
        session.flattened().total_secs()
    )?;
    if wait {
        write!(err, "Press Enter to begin")?;
        err.flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
    }
    Ok(())
}

async fn play(session: BreathingSession, config: &SessionConfig) -> Option<Summary> {
    let mut runner = SessionRunner::new(
        session,
        TickDriver::new(config.tick_interval()),
        config.completion_hold(),
    );
    runner.begin();
    if let Some(frame) = runner.frame() {
        render(&frame);
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    let mut handoff = None;

    loop {
        tokio::select! {
            event = runner.next_event() => match event {
                Some(Event::StateSnapshot { .. }) => {
                    if let Some(frame) = runner.frame() {
                        render(&frame);
                    }
                }
                Some(Event::SessionCompleted { cycles, .. }) => {
                    eprintln!("\nWell done. {cycles} cycles complete.");
                }
                Some(Event::Exited { handoff: h, .. }) => handoff = Some(h),
                Some(_) => {}
                None => break,
            },
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                eprintln!();
                runner.skip();
            }
        }
    }

    let handoff = handoff?;
    let (technique_id, cycles_completed, elapsed_secs, started_at) = runner.with_session(|s| {
        (
            s.technique().id,
            s.cycles_completed(),
            s.elapsed_secs(),
            s.started_at(),
        )
    })?;
    Some(Summary {
        handoff,
        technique_id,
        cycles_completed,
        elapsed_secs,
        quote: quotes::pick(handoff.mood, &mut rand::thread_rng()),
        started_at,
    })
}

fn render(frame: &Frame) {
    let snapshot = &frame.snapshot;
    let level = ((WAVE_TROUGH - frame.indicator.y) / (WAVE_TROUGH - WAVE_SECONDARY_PEAK))
        .clamp(0.0, 1.0);
    let filled = (level * BAR_WIDTH as f64).round() as usize;
    eprint!(
        "\r{} {:<26} {:>3}s  cycle {}/{}  [{}{}] ",
        glyph(frame.icon),
        snapshot.label,
        snapshot.seconds_remaining,
        snapshot.cycle,
        snapshot.total_cycles,
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
    );
    let _ = std::io::stderr().flush();
}

fn glyph(icon: PhaseIcon) -> &'static str {
    match icon {
        PhaseIcon::BreatheIn => "^",
        PhaseIcon::BreatheOut => "v",
        PhaseIcon::PursedLips => "~",
        PhaseIcon::Pause => "-",
    }
}
