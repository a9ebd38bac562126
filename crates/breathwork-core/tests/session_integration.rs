//! Integration tests for breathing sessions.
//!
//! Drives sessions through the public API from request to handoff and
//! checks what ends up in storage.

use breathwork_core::technique::{self, PhaseKind};
use breathwork_core::{
    BreathingSession, Database, Event, ExitReason, Mood, Preferences, Screen, SessionRequest,
    TimerStatus,
};

fn run_to_end(session: &mut BreathingSession) -> Vec<Event> {
    let mut events = Vec::new();
    events.extend(session.begin());
    while session.screen() == Screen::Active {
        events.extend(session.tick());
    }
    events
}

#[test]
fn every_technique_takes_cycle_length_times_cycles() {
    for t in technique::techniques() {
        for cycles in 1..=3 {
            let mut session = BreathingSession::new(t, Mood::Anxious, cycles).unwrap();
            run_to_end(&mut session);
            let expected = u64::from(session.flattened().total_secs()) * u64::from(cycles);
            assert_eq!(session.elapsed_secs(), expected, "{} x{cycles}", t.id);
            assert_eq!(session.cycles_completed(), cycles);
            assert_eq!(session.timer().status(), TimerStatus::Complete);
        }
    }
}

#[test]
fn physiological_sigh_phase_order() {
    let mut session =
        BreathingSession::new(technique::resolve("physiological-sigh"), Mood::Stressed, 2).unwrap();
    let events = run_to_end(&mut session);

    let phases: Vec<PhaseKind> = events
        .iter()
        .filter_map(|e| match e {
            Event::PhaseAdvanced { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            PhaseKind::DoubleInhale,
            PhaseKind::Exhale,
            PhaseKind::DoubleInhale,
            PhaseKind::Exhale,
        ]
    );

    let cycle_ends = events
        .iter()
        .filter(|e| matches!(e, Event::CycleCompleted { .. }))
        .count();
    assert_eq!(cycle_ends, 1);
    assert!(matches!(
        events.last(),
        Some(Event::SessionCompleted { cycles: 2, elapsed_secs: 18, .. })
    ));
}

#[test]
fn final_state_is_held_at_full_progress() {
    let mut session = BreathingSession::new(technique::resolve("box"), Mood::Happy, 1).unwrap();
    run_to_end(&mut session);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.cycle_progress_pct, 100.0);
    assert_eq!(snapshot.phase_progress_pct, 100.0);
    assert_eq!(snapshot.phase, PhaseKind::Hold2);
    assert_eq!(snapshot.seconds_remaining, 0);

    assert!(session.tick().is_none());
    assert_eq!(session.snapshot(), snapshot);
}

#[test]
fn completed_session_is_recorded_with_mood() {
    let db = Database::open_memory().unwrap();
    let prefs = Preferences::new(&db);
    let request = SessionRequest::new(Mood::Grateful).technique("coherent").cycles(2);
    let mut session = BreathingSession::from_request(&request, &prefs).unwrap();

    run_to_end(&mut session);
    let handoff = session.finish().unwrap();
    let ended_at = chrono::Utc::now();
    db.record_session(
        session.technique().id,
        handoff.mood,
        session.cycles_completed(),
        handoff.reason,
        session.elapsed_secs(),
        session.started_at().unwrap(),
        ended_at,
    )
    .unwrap();

    let recent = db.recent_sessions(1).unwrap();
    assert_eq!(recent[0].technique_id, "coherent");
    assert_eq!(recent[0].mood, "grateful");
    assert_eq!(recent[0].outcome, "completed");
    assert_eq!(recent[0].duration_secs, 20);
    assert_eq!(prefs.last_technique(), "coherent");
}

#[test]
fn skipped_session_counts_partial_cycles() {
    let db = Database::open_memory().unwrap();
    let prefs = Preferences::new(&db);
    let request = SessionRequest::new(Mood::Tired).technique("wim-hof").cycles(3);
    let mut session = BreathingSession::from_request(&request, &prefs).unwrap();
    session.begin();
    for _ in 0..60 {
        session.tick();
    }
    let handoff = session.skip().unwrap();
    assert_eq!(handoff.reason, ExitReason::Skipped);
    assert_eq!(session.cycles_completed(), 1);
    assert_eq!(session.snapshot().cycle, 2);

    db.record_session(
        session.technique().id,
        handoff.mood,
        session.cycles_completed(),
        handoff.reason,
        session.elapsed_secs(),
        session.started_at().unwrap(),
        chrono::Utc::now(),
    )
    .unwrap();
    let stats = db.stats_today().unwrap();
    assert_eq!(stats.skipped_sessions, 1);
    assert_eq!(stats.total_breathing_secs, 60);
}

#[test]
fn technique_choice_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("breathwork.db");
    {
        let db = Database::open_at(&path).unwrap();
        let request = SessionRequest::new(Mood::Angry).technique("4-7-8");
        BreathingSession::from_request(&request, &Preferences::new(&db)).unwrap();
    }
    let db = Database::open_at(&path).unwrap();
    let session =
        BreathingSession::from_request(&SessionRequest::new(Mood::Angry), &Preferences::new(&db))
            .unwrap();
    assert_eq!(session.technique().id, "4-7-8");
}
