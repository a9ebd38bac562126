//! Curated quotes shown after a session, and the user's saved list.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, StorageError, ValidationError};
use crate::mood::Mood;
use crate::storage::KeyValueStore;

const SAVED_QUOTES_KEY: &str = "saved_quotes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

const fn q(text: &'static str, author: &'static str) -> Quote {
    Quote { text, author }
}

static ANXIOUS: &[Quote] = &[
    q("You don't have to control your thoughts. You just have to stop letting them control you.", "Dan Millman"),
    q("Nothing diminishes anxiety faster than action.", "Walter Anderson"),
    q("Feelings come and go like clouds in a windy sky. Conscious breathing is my anchor.", "Thich Nhat Hanh"),
];

static STRESSED: &[Quote] = &[
    q("It's not the load that breaks you down, it's the way you carry it.", "Lou Holtz"),
    q("The greatest weapon against stress is our ability to choose one thought over another.", "William James"),
    q("Almost everything will work again if you unplug it for a few minutes, including you.", "Anne Lamott"),
];

static SAD: &[Quote] = &[
    q("Even the darkest night will end and the sun will rise.", "Victor Hugo"),
    q("The wound is the place where the Light enters you.", "Rumi"),
    q("Tears are words that need to be written.", "Paulo Coelho"),
];

static TIRED: &[Quote] = &[
    q("Rest when you're weary. Refresh and renew yourself.", "Ralph Marston"),
    q("Sometimes the most productive thing you can do is relax.", "Mark Black"),
];

static ANGRY: &[Quote] = &[
    q("For every minute you remain angry, you give up sixty seconds of peace of mind.", "Ralph Waldo Emerson"),
    q("Speak when you are angry and you will make the best speech you will ever regret.", "Ambrose Bierce"),
];

static RESTLESS: &[Quote] = &[
    q("Wherever you are, be all there.", "Jim Elliot"),
    q("Nature does not hurry, yet everything is accomplished.", "Lao Tzu"),
];

static GRATEFUL: &[Quote] = &[
    q("Gratitude turns what we have into enough.", "Aesop"),
    q("Joy is the simplest form of gratitude.", "Karl Barth"),
];

static HAPPY: &[Quote] = &[
    q("Happiness is not something ready made. It comes from your own actions.", "Dalai Lama"),
    q("Breath is the bridge which connects life to consciousness.", "Thich Nhat Hanh"),
];

/// Curated quotes for `mood`. Never empty.
pub fn for_mood(mood: Mood) -> &'static [Quote] {
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

/// Pick one quote for `mood` uniformly at random.
pub fn pick<R: Rng + ?Sized>(mood: Mood, rng: &mut R) -> Quote {
    let pool = for_mood(mood);
    pool.choose(rng).copied().unwrap_or(pool[0])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuote {
    pub text: String,
    pub author: String,
    pub mood: Mood,
}

/// Saved quotes, persisted as one JSON list in the key-value store.
pub struct SavedQuotes<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> SavedQuotes<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Current list. A missing or unreadable blob reads as empty.
    pub fn list(&self) -> Vec<SavedQuote> {
        match self.store.get(SAVED_QUOTES_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable saved quotes");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "saved quotes unavailable");
                Vec::new()
            }
        }
    }

    /// Save `quote` unless it is already saved. Returns true when added.
    pub fn save(&self, quote: &Quote, mood: Mood) -> Result<bool, StorageError> {
        let mut saved = self.list();
        if saved.iter().any(|s| s.text == quote.text) {
            return Ok(false);
        }
        saved.push(SavedQuote {
            text: quote.text.to_string(),
            author: quote.author.to_string(),
            mood,
        });
        self.write(&saved)?;
        Ok(true)
    }

    pub fn remove(&self, index: usize) -> Result<SavedQuote, CoreError> {
        let mut saved = self.list();
        if index >= saved.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "saved quotes".into(),
                index,
                len: saved.len(),
            }
            .into());
        }
        let removed = saved.remove(index);
        self.write(&saved)?;
        Ok(removed)
    }

    fn write(&self, saved: &[SavedQuote]) -> Result<(), StorageError> {
        let json = serde_json::to_string(saved).map_err(|e| StorageError::Encoding {
            key: SAVED_QUOTES_KEY.into(),
            message: e.to_string(),
        })?;
        self.store.set(SAVED_QUOTES_KEY, &json)
    }
}
