//! Mood tags.
//!
//! The breathing core never interprets a mood; it carries it from session
//! start to the handoff so quote selection can use it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Anxious,
    #[default]
    Stressed,
    Sad,
    Tired,
    Angry,
    Restless,
    Grateful,
    Happy,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Anxious,
        Mood::Stressed,
        Mood::Sad,
        Mood::Tired,
        Mood::Angry,
        Mood::Restless,
        Mood::Grateful,
        Mood::Happy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Anxious => "anxious",
            Mood::Stressed => "stressed",
            Mood::Sad => "sad",
            Mood::Tired => "tired",
            Mood::Angry => "angry",
            Mood::Restless => "restless",
            Mood::Grateful => "grateful",
            Mood::Happy => "happy",
        }
    }

    /// Technique suggested on the mood picker when none was chosen before.
    pub fn suggested_technique(&self) -> &'static str {
        match self {
            Mood::Anxious | Mood::Angry => "4-7-8",
            Mood::Stressed | Mood::Restless => "physiological-sigh",
            Mood::Tired => "wim-hof",
            Mood::Sad => "coherent",
            Mood::Grateful | Mood::Happy => "box",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownMood(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technique;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Anxious".parse::<Mood>().unwrap(), Mood::Anxious);
        assert_eq!(" tired ".parse::<Mood>().unwrap(), Mood::Tired);
    }

    #[test]
    fn unknown_mood_is_rejected() {
        assert_eq!(
            "meh".parse::<Mood>().unwrap_err(),
            ValidationError::UnknownMood("meh".into())
        );
    }

    #[test]
    fn suggestions_name_real_techniques() {
        for mood in Mood::ALL {
            assert!(technique::find(mood.suggested_technique()).is_some());
        }
    }
}
