//! Animation actions and their frame counts.

use serde::Serialize;

pub const ACTION_IDLE: &str = "idle";
pub const ACTION_WALK: &str = "walk";
pub const ACTION_JUMP: &str = "jump";
pub const ACTION_AIR_ATTACK: &str = "air_attack";
pub const ACTION_HURT: &str = "hurt";
pub const ACTION_KNOCK_OUT: &str = "knock_out";
pub const ACTION_PUNCHES: &str = "punches";
pub const ACTION_TURN_AROUND: &str = "turn_around";

/// A named animation made of an ordered run of frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Number of frames requested by a full sequence.
    pub frame_count: u32,
    /// Pose/motion description spliced into the prompt.
    #[serde(skip)]
    pub motion: &'static str,
}

pub const ACTIONS: &[ActionDescriptor] = &[
    ActionDescriptor {
        id: ACTION_IDLE,
        display_name: "Idle",
        frame_count: 4,
        motion: "standing idle with a subtle breathing motion",
    },
    ActionDescriptor {
        id: ACTION_WALK,
        display_name: "Walk",
        frame_count: 6,
        motion: "walking to the right in a side view walk cycle",
    },
    ActionDescriptor {
        id: ACTION_JUMP,
        display_name: "Jump",
        frame_count: 4,
        motion: "jumping: crouch, take-off, airborne peak and landing",
    },
    ActionDescriptor {
        id: ACTION_AIR_ATTACK,
        display_name: "Air Attack",
        frame_count: 4,
        motion: "attacking while airborne with a downward strike",
    },
    ActionDescriptor {
        id: ACTION_HURT,
        display_name: "Hurt",
        frame_count: 3,
        motion: "recoiling backwards after being hit",
    },
    ActionDescriptor {
        id: ACTION_KNOCK_OUT,
        display_name: "Knock Out",
        frame_count: 5,
        motion: "being knocked out and collapsing to the ground",
    },
    ActionDescriptor {
        id: ACTION_PUNCHES,
        display_name: "Punches",
        frame_count: 4,
        motion: "throwing a quick jab followed by a cross punch",
    },
    ActionDescriptor {
        id: ACTION_TURN_AROUND,
        display_name: "Turn Around",
        frame_count: 3,
        motion: "turning around from facing right to facing left",
    },
];

/// Look up an action by id.
pub fn find_action(id: &str) -> Option<&'static ActionDescriptor> {
    ACTIONS.iter().find(|a| a.id == id)
}
