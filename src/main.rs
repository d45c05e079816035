//! Headless simulation entry point: loads the config, stages a two-sided
//! skirmish, and runs until one stronghold falls.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::transform::TransformPlugin;

use the_fist::GameState;
use the_fist::config::{BuildingKind, GameConfig, UnitKind};
use the_fist::gameplay::Faction;
use the_fist::gameplay::ai::StrategicTarget;
use the_fist::gameplay::buildings::{BuildOrder, BuildingSlot, UnlockOrder};
use the_fist::gameplay::combat::Health;
use the_fist::gameplay::endgame::Stronghold;
use the_fist::gameplay::units::{UnitCatalog, spawn_unit};

/// 60 simulation ticks per second.
const TICK_INTERVAL: Duration = Duration::from_micros(16_667);

const PLAYER_STRONGHOLD: Vec2 = Vec2::new(0.0, 0.0);
const ENEMY_STRONGHOLD: Vec2 = Vec2::new(1_200.0, 0.0);
const STRONGHOLD_HEALTH: f32 = 2_000.0;
const STRONGHOLD_SIZE: f32 = 96.0;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(TICK_INTERVAL)))
        .add_plugins((LogPlugin::default(), StatesPlugin, TransformPlugin))
        .insert_resource(load_config())
        .add_plugins(the_fist::plugin)
        .add_systems(Startup, begin_match)
        .add_systems(OnEnter(GameState::InGame), setup_scenario)
        .add_systems(OnEnter(GameState::Victory), report_victory)
        .add_systems(OnEnter(GameState::Defeat), report_defeat)
        .run();
}

/// The bundled RON config, falling back to compiled-in defaults when it does
/// not parse or fails validation. The logger is not up yet, hence `eprintln!`.
fn load_config() -> GameConfig {
    let source = include_str!("../assets/config.ron");
    let config = match GameConfig::from_ron(source) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("assets/config.ron is invalid ({err}); using built-in defaults");
            return GameConfig::default();
        }
    };
    if let Err(err) = config.validate() {
        eprintln!("assets/config.ron is invalid ({err}); using built-in defaults");
        return GameConfig::default();
    }
    config
}

fn begin_match(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}

fn spawn_stronghold(commands: &mut Commands, faction: Faction, position: Vec2) {
    commands.spawn((
        Name::new(format!("{faction:?} Stronghold")),
        Stronghold,
        faction,
        Health::new(STRONGHOLD_HEALTH),
        Collider::rectangle(STRONGHOLD_SIZE, STRONGHOLD_SIZE),
        Transform::from_xyz(position.x, position.y, 0.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn spawn_slot(commands: &mut Commands, faction: Faction, position: Vec2) -> Entity {
    commands
        .spawn((
            Name::new("Building Slot"),
            BuildingSlot::default(),
            faction,
            Transform::from_xyz(position.x, position.y, 0.0),
        ))
        .id()
}

/// Stages the skirmish: two strongholds, a player base built through the
/// order pipeline, and an enemy wave marching on the player.
fn setup_scenario(
    mut commands: Commands,
    catalog: Res<UnitCatalog>,
    mut build_orders: MessageWriter<BuildOrder>,
    mut unlock_orders: MessageWriter<UnlockOrder>,
) {
    spawn_stronghold(&mut commands, Faction::Player, PLAYER_STRONGHOLD);
    spawn_stronghold(&mut commands, Faction::Enemy, ENEMY_STRONGHOLD);

    // Player base: a barracks and a gold mine, built and unlocked through
    // the same orders an in-game actor would issue.
    let barracks_slot = spawn_slot(&mut commands, Faction::Player, Vec2::new(80.0, 140.0));
    let mine_slot = spawn_slot(&mut commands, Faction::Player, Vec2::new(80.0, -140.0));
    build_orders.write(BuildOrder {
        slot: barracks_slot,
        kind: BuildingKind::Barracks,
    });
    build_orders.write(BuildOrder {
        slot: mine_slot,
        kind: BuildingKind::GoldMine,
    });
    unlock_orders.write(UnlockOrder {
        slot: barracks_slot,
    });
    unlock_orders.write(UnlockOrder { slot: mine_slot });

    // Player garrison.
    for i in 0..3 {
        let position = Vec2::new(160.0, -60.0 + 60.0 * i as f32);
        march(&mut commands, &catalog, UnitKind::Militia, Faction::Player, position, ENEMY_STRONGHOLD);
    }
    march(
        &mut commands,
        &catalog,
        UnitKind::Archer,
        Faction::Player,
        Vec2::new(120.0, 0.0),
        ENEMY_STRONGHOLD,
    );

    // Enemy wave.
    for i in 0..6 {
        let position = Vec2::new(1_040.0, -150.0 + 60.0 * i as f32);
        march(&mut commands, &catalog, UnitKind::Militia, Faction::Enemy, position, PLAYER_STRONGHOLD);
    }
    for i in 0..2 {
        let position = Vec2::new(1_100.0, -30.0 + 60.0 * i as f32);
        march(&mut commands, &catalog, UnitKind::Archer, Faction::Enemy, position, PLAYER_STRONGHOLD);
    }

    info!("skirmish staged; simulating until a stronghold falls");
}

/// Spawns a unit and points its strategic heading at the opposing base.
fn march(
    commands: &mut Commands,
    catalog: &UnitCatalog,
    kind: UnitKind,
    faction: Faction,
    position: Vec2,
    heading: Vec2,
) {
    if let Some(entity) = spawn_unit(commands, catalog, kind, faction, position) {
        commands
            .entity(entity)
            .insert(StrategicTarget(Some(heading)));
    }
}

fn report_victory(mut app_exit: MessageWriter<AppExit>) {
    info!("enemy stronghold destroyed; victory");
    app_exit.write(AppExit::Success);
}

fn report_defeat(mut app_exit: MessageWriter<AppExit>) {
    info!("player stronghold destroyed; defeat");
    app_exit.write(AppExit::Success);
}
