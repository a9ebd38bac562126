//! Check-in prompts: small social exercises offered after a session.
//!
//! Each mood has its own pool of prompts. Finishing one counts as a good
//! deed on the do-good tally.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::counters::{Clock, CounterStore};
use crate::mood::Mood;
use crate::storage::{DoGoodConfig, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckInPrompt {
    /// Question to ask someone else
    pub question: &'static str,
    /// Concrete suggestion for how to ask it
    pub nudge: &'static str,
}

const fn p(question: &'static str, nudge: &'static str) -> CheckInPrompt {
    CheckInPrompt { question, nudge }
}

static ANXIOUS: &[CheckInPrompt] = &[
    p("What's one thing that helped you calm down recently?", "Send it to a friend who keeps you grounded."),
    p("How are you really doing this week?", "Ask someone you haven't heard from in a while."),
];

static STRESSED: &[CheckInPrompt] = &[
    p("Is there anything on your plate I could take off it?", "Offer it to a coworker or housemate."),
    p("What are you looking forward to this weekend?", "Ask someone who's been busy lately."),
];

static SAD: &[CheckInPrompt] = &[
    p("What's a memory of us that still makes you laugh?", "Message an old friend."),
    p("Can I call you later just to catch up?", "Reach out to family."),
];

static TIRED: &[CheckInPrompt] = &[
    p("Want to take a short walk together?", "Invite someone nearby."),
    p("How have you been sleeping?", "Check on someone who's been working late."),
];

static ANGRY: &[CheckInPrompt] = &[
    p("Is there something you've been wanting to vent about?", "Be the listener for someone today."),
    p("What's one small win you had today?", "Ask a friend and share yours too."),
];

static RESTLESS: &[CheckInPrompt] = &[
    p("Want to try something new together this week?", "Suggest a plan to a friend."),
    p("What's the last thing that really caught your interest?", "Ask someone curious."),
];

static GRATEFUL: &[CheckInPrompt] = &[
    p("Did you know you made a difference for me?", "Tell someone exactly how they helped you."),
    p("What's something you're thankful for today?", "Swap answers with a friend."),
];

static HAPPY: &[CheckInPrompt] = &[
    p("What made you smile today?", "Pass the good mood on to someone."),
    p("When can we celebrate something together?", "Plan a small get-together."),
];

/// Prompt pool for `mood`.
pub fn for_mood(mood: Mood) -> &'static [CheckInPrompt] {
    match mood {
        Mood::Anxious => ANXIOUS,
        Mood::Stressed => STRESSED,
        Mood::Sad => SAD,
        Mood::Tired => TIRED,
        Mood::Angry => ANGRY,
        Mood::Restless => RESTLESS,
        Mood::Grateful => GRATEFUL,
        Mood::Happy => HAPPY,
    }
}

/// Random prompt for `mood`.
pub fn pick<R: Rng + ?Sized>(mood: Mood, rng: &mut R) -> CheckInPrompt {
    let pool = for_mood(mood);
    pool.choose(rng).copied().unwrap_or(pool[0])
}

/// Mark a check-in as done. Returns the do-good count after recording it.
pub fn complete<S, C>(counters: &CounterStore<'_, S>, clock: &C, config: &DoGoodConfig) -> u32
where
    S: KeyValueStore + ?Sized,
    C: Clock + ?Sized,
{
    let count = counters.record_do_good(clock, config);
    tracing::debug!(count, "check-in completed");
    count
}
