//! AI: periodic target scanning and the per-entity decision loop that turns
//! scan results into engagements, assists, and move orders.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod decision;
pub mod scanner;

pub use decision::{InteractionRequest, StrategicTarget, TargetAcquired, TargetLost};
pub use scanner::{ScannedTargets, TargetScanner};

/// What an entity's decision loop is allowed to do and how it ranks targets.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct AiProfile {
    /// Engage hostile targets.
    pub can_attack: bool,
    /// Approach friendly targets and request interactions (unlock, upgrade).
    pub can_assist: bool,
    pub policy: TargetPolicy,
}

/// How a hostile target is picked from the scan results.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub enum TargetPolicy {
    /// Closest surface-to-surface distance wins. Ties go to the target seen
    /// first in the scan list.
    Nearest,
    /// Highest score wins: a flat bonus for destructible targets minus a
    /// distance penalty.
    Scored {
        destructible_bonus: f32,
        distance_weight: f32,
    },
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<AiProfile>();
    app.add_plugins((scanner::plugin, decision::plugin));
}
