//! Prompt construction for style and animation-frame requests.
//!
//! Every prompt is assembled from the shared sprite primer, a style clause,
//! an action clause, the reference token, and a frame clause. Unknown style
//! or action ids fall back to generic clauses instead of failing, so
//! [`build_prompt`] is total.

use serde::{Deserialize, Serialize};

use crate::actions::find_action;
use crate::reference::ReferenceToken;
use crate::styles::find_style;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Description used when the caller supplies an empty one.
pub const DEFAULT_CHARACTER_DESCRIPTION: &str = "A character for a video game sprite";

/// Rules shared by every sprite prompt.
pub const SPRITE_PRIMER: &str = "Create a single 2D video game sprite of one character, \
     centred on a plain transparent background, full body visible, no text, \
     no watermark, no border and no scenery.";

/// Style clause used for ids outside the fixed style set.
pub const FALLBACK_STYLE_FRAGMENT: &str = "clean 2D game sprite rendering with clear \
     silhouettes and consistent lighting";

/// Action clause used for ids outside the fixed action set.
pub const FALLBACK_ACTION_MOTION: &str = "in a neutral standing pose";

// ---------------------------------------------------------------------------
// Frame spec
// ---------------------------------------------------------------------------

/// Position of one frame within an action's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSpec {
    pub action_id: String,
    pub frame_index: u32,
    /// Whether the prompt references the previous frame for continuity.
    pub is_continuation: bool,
}

impl FrameSpec {
    /// Frame with the default continuation flag (`frame_index > 0`).
    pub fn new(action_id: impl Into<String>, frame_index: u32) -> Self {
        Self {
            action_id: action_id.into(),
            frame_index,
            is_continuation: frame_index > 0,
        }
    }

    /// Override the continuation flag.
    pub fn with_continuation(mut self, is_continuation: bool) -> Self {
        self.is_continuation = is_continuation;
        self
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the prompt for a style preview (action `idle`, first frame).
pub fn build_style_prompt(
    style_id: &str,
    reference_token: &ReferenceToken,
    character_description: &str,
) -> String {
    build_prompt(
        style_id,
        &FrameSpec::new(crate::actions::ACTION_IDLE, 0),
        reference_token,
        character_description,
    )
}

/// Build the full prompt for one frame of one style.
///
/// Deterministic: identical inputs always produce identical output.
pub fn build_prompt(
    style_id: &str,
    frame: &FrameSpec,
    reference_token: &ReferenceToken,
    character_description: &str,
) -> String {
    let description = match character_description.trim() {
        "" => DEFAULT_CHARACTER_DESCRIPTION,
        trimmed => trimmed,
    };

    let style_clause = match find_style(style_id) {
        Some(style) => format!("Art style: {} ({}).", style.display_name, style.prompt_fragment),
        None => format!("Art style: {FALLBACK_STYLE_FRAGMENT}."),
    };

    // One-based position, widened so the last u32 index still renders.
    let position = u64::from(frame.frame_index) + 1;
    let action_clause = match find_action(&frame.action_id) {
        Some(action) => format!(
            "Pose: the character is {} (frame {position} of {}).",
            action.motion,
            u64::from(action.frame_count).max(position)
        ),
        None => format!("Pose: the character is {FALLBACK_ACTION_MOTION} (frame {position})."),
    };

    let frame_clause = if frame.is_continuation {
        format!(
            "This frame continues the sequence: keep the character's appearance, \
             proportions, colours, outfit and camera framing identical to frame {} \
             of reference {}, changing only the pose.",
            frame.frame_index.max(1),
            reference_token
        )
    } else {
        "This is the first key pose of the sequence and defines the character's \
         appearance for every later frame."
            .to_string()
    };

    format!(
        "{SPRITE_PRIMER}\n\
         Character: {description}\n\
         {style_clause}\n\
         {action_clause}\n\
         Reference: {reference_token}\n\
         {frame_clause}"
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
