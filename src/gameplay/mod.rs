//! Gameplay domain: factions, combat, AI, movement, units, buildings,
//! economy, and endgame detection.

pub mod ai;
pub mod buildings;
pub mod combat;
pub mod economy;
pub mod endgame;
pub mod movement;
pub mod units;

use bevy::prelude::*;

/// Team alignment used for friend/foe resolution.
///
/// Assigned once at spawn and never mutated afterwards.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum Faction {
    Player,
    Enemy,
    /// Aligned with neither side; treated as hostile by both, since any
    /// faction mismatch is hostile.
    Neutral,
}

impl Faction {
    /// Friend/foe test: any differing faction is hostile.
    #[must_use]
    pub fn is_hostile_to(self, other: Self) -> bool {
        self != other
    }
}

/// The entity this seeker is currently focused on, written by the AI
/// decision loop each tick. `None` while idle.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct CurrentTarget(pub Option<Entity>);

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Faction>().register_type::<CurrentTarget>();

    app.add_plugins((
        ai::plugin,
        buildings::plugin,
        combat::plugin,
        economy::plugin,
        endgame::plugin,
        movement::plugin,
        units::plugin,
    ));
}
