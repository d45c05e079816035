//! Building production: timed unit training.

use bevy::prelude::*;
use rand::Rng as _;

use crate::config::{TrainerSpec, UnitKind};
use crate::gameplay::Faction;
use crate::gameplay::units::{UnitCatalog, spawn_unit};
use crate::{GameSet, gameplay_running};

/// How far in front of the building trained units appear. Player buildings
/// rally to the right, enemy buildings to the left.
const RALLY_OFFSET: f32 = 40.0;

/// Vertical scatter so units from one building do not stack on a point.
const RALLY_JITTER: f32 = 8.0;

// === Components ===

/// Timed unit production. Attached to buildings when they unlock, so a
/// locked shell never trains.
#[derive(Component, Debug, Clone)]
pub struct UnitTrainer {
    pub unit: UnitKind,
    pub timer: Timer,
}

impl UnitTrainer {
    #[must_use]
    pub fn from_spec(spec: &TrainerSpec) -> Self {
        Self {
            unit: spec.unit,
            timer: Timer::from_seconds(spec.interval_secs, TimerMode::Repeating),
        }
    }
}

// === Systems ===

/// Ticks trainer timers and spawns units at the rally point when they fire.
/// Runs in `GameSet::Production`.
fn tick_trainers(
    time: Res<Time>,
    mut trainers: Query<(&mut UnitTrainer, &Faction, &Transform)>,
    catalog: Res<UnitCatalog>,
    mut commands: Commands,
) {
    let mut rng = rand::rng();
    for (mut trainer, faction, transform) in &mut trainers {
        trainer.timer.tick(time.delta());
        if !trainer.timer.just_finished() {
            continue;
        }

        let offset = match faction {
            Faction::Player => RALLY_OFFSET,
            Faction::Enemy | Faction::Neutral => -RALLY_OFFSET,
        };
        let rally = Vec2::new(
            transform.translation.x + offset,
            transform.translation.y + rng.random_range(-RALLY_JITTER..=RALLY_JITTER),
        );
        spawn_unit(&mut commands, &catalog, trainer.unit, *faction, rally);
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        tick_trainers
            .in_set(GameSet::Production)
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::gameplay::units::Unit;
    use crate::testing::{assert_entity_count, nearly_expire_timer};
    use pretty_assertions::assert_eq;

    fn create_production_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(UnitCatalog::new(&GameConfig::default()));
        app.add_systems(Update, tick_trainers);
        app.update(); // Initialize time (first frame delta=0)
        app
    }

    /// A trainer that fires on the next tick with any positive delta.
    fn nearly_elapsed_trainer(unit: UnitKind) -> UnitTrainer {
        let mut trainer = UnitTrainer {
            unit,
            timer: Timer::from_seconds(3.0, TimerMode::Repeating),
        };
        nearly_expire_timer(&mut trainer.timer);
        trainer
    }

    #[test]
    fn trainer_spawns_a_unit() {
        let mut app = create_production_test_app();

        app.world_mut().spawn((
            nearly_elapsed_trainer(UnitKind::Militia),
            Faction::Player,
            Transform::from_xyz(100.0, 100.0, 0.0),
        ));
        app.update();

        assert_entity_count::<With<Unit>>(&mut app, 1);
    }

    #[test]
    fn trained_unit_inherits_the_building_faction() {
        let mut app = create_production_test_app();

        app.world_mut().spawn((
            nearly_elapsed_trainer(UnitKind::Militia),
            Faction::Enemy,
            Transform::from_xyz(900.0, 100.0, 0.0),
        ));
        app.update();

        let mut query = app.world_mut().query_filtered::<&Faction, With<Unit>>();
        let faction = query.single(app.world()).unwrap();
        assert_eq!(*faction, Faction::Enemy);
    }

    #[test]
    fn rally_point_faces_the_right_way() {
        let mut app = create_production_test_app();

        app.world_mut().spawn((
            nearly_elapsed_trainer(UnitKind::Militia),
            Faction::Player,
            Transform::from_xyz(100.0, 100.0, 0.0),
        ));
        app.world_mut().spawn((
            nearly_elapsed_trainer(UnitKind::Militia),
            Faction::Enemy,
            Transform::from_xyz(900.0, 100.0, 0.0),
        ));
        app.update();

        let mut query = app
            .world_mut()
            .query_filtered::<(&Faction, &Transform), With<Unit>>();
        for (faction, transform) in query.iter(app.world()) {
            match faction {
                Faction::Player => assert_eq!(transform.translation.x, 100.0 + RALLY_OFFSET),
                Faction::Enemy => assert_eq!(transform.translation.x, 900.0 - RALLY_OFFSET),
                Faction::Neutral => unreachable!(),
            }
            let jitter = (transform.translation.y - 100.0).abs();
            assert!(jitter <= RALLY_JITTER);
        }
    }

    #[test]
    fn idle_trainer_spawns_nothing() {
        let mut app = create_production_test_app();

        app.world_mut().spawn((
            UnitTrainer {
                unit: UnitKind::Militia,
                timer: Timer::from_seconds(10_000.0, TimerMode::Repeating),
            },
            Faction::Player,
            Transform::from_xyz(100.0, 100.0, 0.0),
        ));
        app.update();

        assert_entity_count::<With<Unit>>(&mut app, 0);
    }
}
