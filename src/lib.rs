//! TheFist simulation core: an RTS/action hybrid without the engine glue.
//!
//! Everything here is headless ECS: units, buildings, and strongholds are
//! entities; perception, targeting, combat, production, and the economy run
//! as chained system sets inside the `Update` schedule. Rendering, input,
//! and UI are deliberately absent; subscribers hang off the message types in
//! [`gameplay`] instead.

pub mod config;
pub mod gameplay;
#[cfg(test)]
pub mod testing;
pub mod third_party;

use bevy::prelude::*;

/// Primary game states, driven by the endgame checks in [`gameplay::endgame`].
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Initial state before a match is set up.
    #[default]
    Loading,
    /// Active simulation.
    InGame,
    /// The player side destroyed the enemy stronghold.
    Victory,
    /// The player stronghold was destroyed.
    Defeat,
}

/// Fixed per-tick phase ordering for the simulation.
///
/// Chained in [`plugin`], so within one `Update` pass perception always
/// precedes decisions, decisions precede motion and combat, and the death
/// sweep runs last.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    /// Periodic proximity scans rebuild candidate caches.
    Scan,
    /// Target selection and engage/disengage dispatch.
    Ai,
    /// Locomotion toward move commands.
    Movement,
    /// Cooldowns, attack execution, projectile flight, damage.
    Combat,
    /// Resource generation and unit training.
    Production,
    /// Kill rewards, endgame detection, despawn of dead entities.
    Death,
}

/// Run condition: the simulation only advances while a match is in progress.
pub fn gameplay_running(state: Res<State<GameState>>) -> bool {
    matches!(state.get(), GameState::InGame)
}

/// Top-level plugin: state machine, phase ordering, and all gameplay systems.
///
/// Callers provide `MinimalPlugins` and `StatesPlugin` (and `TransformPlugin`
/// when transform propagation matters); see `main.rs` and the test apps.
pub fn plugin(app: &mut App) {
    app.init_state::<GameState>();

    // Callers that load an external config insert it before this plugin;
    // everyone else gets the compiled-in defaults.
    app.init_resource::<config::GameConfig>();

    app.configure_sets(
        Update,
        (
            GameSet::Scan,
            GameSet::Ai,
            GameSet::Movement,
            GameSet::Combat,
            GameSet::Production,
            GameSet::Death,
        )
            .chain(),
    );

    app.add_plugins(gameplay::plugin);
}
