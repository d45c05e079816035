//! Endgame detection: checks stronghold health and ends the session.

use bevy::prelude::*;

use crate::GameState;
use crate::gameplay::Faction;
use crate::gameplay::combat::{DeathCheck, Health};

/// Marker for the session-deciding structure of each faction. A faction
/// loses the moment its stronghold dies.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Stronghold;

/// Checks stronghold health each frame. Defeat is checked first, so a
/// simultaneous wipe still counts as a loss.
/// Runs before `DeathCheck` so the dying stronghold is still queryable.
fn detect_endgame(
    strongholds: Query<(&Health, &Faction), With<Stronghold>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let dead_faction = |faction: Faction| {
        strongholds
            .iter()
            .any(|(health, &f)| f == faction && health.is_dead())
    };

    if dead_faction(Faction::Player) {
        next_state.set(GameState::Defeat);
    } else if dead_faction(Faction::Enemy) {
        next_state.set(GameState::Victory);
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Stronghold>();

    app.add_systems(
        Update,
        detect_endgame
            .in_set(crate::GameSet::Death)
            .before(DeathCheck)
            .run_if(crate::gameplay_running),
    );
}
