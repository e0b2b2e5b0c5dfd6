//! Chat request categories and the few-shot classification prompt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::actions;
use crate::error::CoreError;

/// What a free-text chat message asks the tool to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Character,
    Idle,
    Walk,
    Jump,
    AirAttack,
    Hurt,
    KnockOut,
    Punches,
    TurnAround,
    Unknown,
}

impl Category {
    /// Every category, in classifier order.
    pub const ALL: [Category; 10] = [
        Self::Character,
        Self::Idle,
        Self::Walk,
        Self::Jump,
        Self::AirAttack,
        Self::Hurt,
        Self::KnockOut,
        Self::Punches,
        Self::TurnAround,
        Self::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Idle => "idle",
            Self::Walk => "walk",
            Self::Jump => "jump",
            Self::AirAttack => "air_attack",
            Self::Hurt => "hurt",
            Self::KnockOut => "knock_out",
            Self::Punches => "punches",
            Self::TurnAround => "turn_around",
            Self::Unknown => "unknown",
        }
    }

    /// Numeric id of the category (position in [`Category::ALL`]).
    pub fn id(self) -> u8 {
        match self {
            Self::Character => 0,
            Self::Idle => 1,
            Self::Walk => 2,
            Self::Jump => 3,
            Self::AirAttack => 4,
            Self::Hurt => 5,
            Self::KnockOut => 6,
            Self::Punches => 7,
            Self::TurnAround => 8,
            Self::Unknown => 9,
        }
    }

    /// The animation action this category requests, if any.
    pub fn action_id(self) -> Option<&'static str> {
        match self {
            Self::Idle => Some(actions::ACTION_IDLE),
            Self::Walk => Some(actions::ACTION_WALK),
            Self::Jump => Some(actions::ACTION_JUMP),
            Self::AirAttack => Some(actions::ACTION_AIR_ATTACK),
            Self::Hurt => Some(actions::ACTION_HURT),
            Self::KnockOut => Some(actions::ACTION_KNOCK_OUT),
            Self::Punches => Some(actions::ACTION_PUNCHES),
            Self::TurnAround => Some(actions::ACTION_TURN_AROUND),
            Self::Character | Self::Unknown => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    /// Exact match against the category names; callers normalise first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown category '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Few-shot examples
// ---------------------------------------------------------------------------

/// One labelled example embedded in the classification prompt.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationExample {
    pub text: &'static str,
    pub category: Category,
}

pub const CLASSIFICATION_EXAMPLES: &[ClassificationExample] = &[
    ClassificationExample { text: "Create a wizard character", category: Category::Character },
    ClassificationExample { text: "Generate a knight sprite", category: Category::Character },
    ClassificationExample { text: "Make a cyberpunk hacker", category: Category::Character },
    ClassificationExample { text: "Design a forest elf", category: Category::Character },
    ClassificationExample { text: "Make an idle animation", category: Category::Idle },
    ClassificationExample { text: "Create a walking cycle", category: Category::Walk },
    ClassificationExample { text: "Generate a jump animation", category: Category::Jump },
    ClassificationExample { text: "Make an air attack", category: Category::AirAttack },
    ClassificationExample { text: "Create a hurt animation", category: Category::Hurt },
    ClassificationExample { text: "Generate a knockout sequence", category: Category::KnockOut },
    ClassificationExample { text: "Make a punch combo", category: Category::Punches },
    ClassificationExample { text: "Create a turn around animation", category: Category::TurnAround },
    ClassificationExample { text: "How does this work?", category: Category::Unknown },
    ClassificationExample { text: "What can you do?", category: Category::Unknown },
    ClassificationExample { text: "Help me understand", category: Category::Unknown },
];

/// Build the classification prompt for one user message.
pub fn build_classification_prompt(message: &str) -> String {
    let names = Category::ALL.map(Category::as_str).join(", ");
    let examples = CLASSIFICATION_EXAMPLES
        .iter()
        .map(|ex| format!("\"{}\" → {}", ex.text, ex.category))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a chat message classifier for a sprite generation application.\n\
         Analyze the user's message and determine which category it belongs to.\n\
         \n\
         Available categories: {names}\n\
         \n\
         Examples:\n\
         {examples}\n\
         \n\
         User message: \"{message}\"\n\
         \n\
         Respond with ONLY the category keyword (like \"character\" or \"walk\").\n\
         If the message doesn't clearly fit any category, respond with \"unknown\".\n"
    )
}

/// Normalise a raw model reply and validate it against the category set.
///
/// Returns `None` for anything that is not exactly one category name after
/// trimming and lowercasing.
pub fn parse_classifier_reply(raw: &str) -> Option<Category> {
    raw.trim().to_lowercase().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_categories_with_sequential_ids() {
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.id() as usize, i);
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
    }

    #[test]
    fn only_animation_categories_map_to_actions() {
        assert_eq!(Category::AirAttack.action_id(), Some("air_attack"));
        assert!(Category::Character.action_id().is_none());
        assert!(Category::Unknown.action_id().is_none());
    }

    #[test]
    fn prompt_embeds_examples_and_message() {
        let prompt = build_classification_prompt("Make a dragon");
        assert!(prompt.contains("\"Create a wizard character\" → character"));
        assert!(prompt.contains("knock_out"));
        assert!(prompt.contains("User message: \"Make a dragon\""));
    }

    #[test]
    fn reply_is_trimmed_and_lowercased() {
        assert_eq!(parse_classifier_reply("  Walk\n"), Some(Category::Walk));
        assert_eq!(parse_classifier_reply("AIR_ATTACK"), Some(Category::AirAttack));
    }

    #[test]
    fn reply_outside_set_is_rejected() {
        assert_eq!(parse_classifier_reply("dance"), None);
        assert_eq!(parse_classifier_reply("\"walk\""), None);
        assert_eq!(parse_classifier_reply(""), None);
    }
}
