//! Income systems: passive generators and kill rewards.

use bevy::prelude::*;

use super::{ResourceBank, ResourceKind};
use crate::config::GeneratorSpec;
use crate::gameplay::Faction;
use crate::gameplay::combat::{DeathCheck, UnitDied};
use crate::{GameSet, gameplay_running};

/// Gold awarded per enemy kill.
pub const KILL_REWARD: u32 = 5;

// === Components ===

/// Passive income. Attached to buildings when they unlock and removed with
/// them, so a locked shell never earns.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ResourceGenerator {
    pub resource: ResourceKind,
    pub amount_per_tick: u32,
    pub timer: Timer,
}

impl ResourceGenerator {
    #[must_use]
    pub fn from_spec(spec: &GeneratorSpec) -> Self {
        Self {
            resource: spec.resource,
            amount_per_tick: spec.amount_per_tick,
            timer: Timer::from_seconds(spec.interval_secs, TimerMode::Repeating),
        }
    }
}

// === Systems ===

/// Ticks generator timers and deposits on each firing.
/// Runs in `GameSet::Production`.
fn tick_generators(
    time: Res<Time>,
    mut generators: Query<&mut ResourceGenerator>,
    mut bank: ResMut<ResourceBank>,
) {
    for mut generator in &mut generators {
        generator.timer.tick(time.delta());
        if generator.timer.just_finished() {
            let amount = generator.amount_per_tick;
            bank.add(generator.resource, amount);
        }
    }
}

/// Pays out for enemy deaths reported this frame.
/// Runs in `GameSet::Death` before `DeathCheck`, with the other systems that
/// settle accounts while the corpse still exists.
fn award_kill_rewards(mut died: MessageReader<UnitDied>, mut bank: ResMut<ResourceBank>) {
    for death in died.read() {
        if death.faction == Faction::Enemy {
            bank.add(ResourceKind::Gold, KILL_REWARD);
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<ResourceGenerator>();

    app.add_systems(
        Update,
        tick_generators
            .in_set(GameSet::Production)
            .run_if(gameplay_running),
    );

    app.add_systems(
        Update,
        award_kill_rewards
            .in_set(GameSet::Death)
            .before(DeathCheck)
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::nearly_expire_timer;
    use pretty_assertions::assert_eq;

    fn create_generator_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<ResourceBank>();
        app.add_systems(Update, tick_generators);
        app.update(); // Initialize time (first frame delta=0)
        app
    }

    /// A generator that fires on the next tick with any positive delta.
    fn nearly_elapsed_generator(resource: ResourceKind, amount: u32) -> ResourceGenerator {
        let mut timer = Timer::from_seconds(1.0, TimerMode::Repeating);
        nearly_expire_timer(&mut timer);
        ResourceGenerator {
            resource,
            amount_per_tick: amount,
            timer,
        }
    }

    #[test]
    fn generator_deposits_on_tick() {
        let mut app = create_generator_test_app();

        app.world_mut()
            .spawn(nearly_elapsed_generator(ResourceKind::Gold, 3));
        app.update();

        let bank = app.world().resource::<ResourceBank>();
        assert_eq!(bank.amount(ResourceKind::Gold), 3);
    }

    #[test]
    fn generators_deposit_independently() {
        let mut app = create_generator_test_app();

        app.world_mut()
            .spawn(nearly_elapsed_generator(ResourceKind::Gold, 3));
        app.world_mut()
            .spawn(nearly_elapsed_generator(ResourceKind::Prestige, 1));
        app.update();

        let bank = app.world().resource::<ResourceBank>();
        assert_eq!(bank.amount(ResourceKind::Gold), 3);
        assert_eq!(bank.amount(ResourceKind::Prestige), 1);
    }

    #[test]
    fn idle_generator_deposits_nothing() {
        let mut app = create_generator_test_app();

        app.world_mut().spawn(ResourceGenerator {
            resource: ResourceKind::Gold,
            amount_per_tick: 3,
            timer: Timer::from_seconds(10_000.0, TimerMode::Repeating),
        });
        app.update();

        let bank = app.world().resource::<ResourceBank>();
        assert_eq!(bank.amount(ResourceKind::Gold), 0);
    }

    fn create_kill_reward_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<ResourceBank>();
        app.add_message::<UnitDied>();
        app.add_systems(Update, award_kill_rewards);
        app
    }

    #[test]
    fn enemy_death_pays_out() {
        let mut app = create_kill_reward_test_app();

        app.world_mut().write_message(UnitDied {
            entity: Entity::PLACEHOLDER,
            faction: Faction::Enemy,
        });
        app.update();

        let bank = app.world().resource::<ResourceBank>();
        assert_eq!(bank.amount(ResourceKind::Gold), KILL_REWARD);
    }

    #[test]
    fn player_death_pays_nothing() {
        let mut app = create_kill_reward_test_app();

        app.world_mut().write_message(UnitDied {
            entity: Entity::PLACEHOLDER,
            faction: Faction::Player,
        });
        app.update();

        let bank = app.world().resource::<ResourceBank>();
        assert_eq!(bank.amount(ResourceKind::Gold), 0);
    }

    #[test]
    fn three_kills_pay_three_rewards() {
        let mut app = create_kill_reward_test_app();

        for _ in 0..3 {
            app.world_mut().write_message(UnitDied {
                entity: Entity::PLACEHOLDER,
                faction: Faction::Enemy,
            });
        }
        app.update();

        let bank = app.world().resource::<ResourceBank>();
        assert_eq!(bank.amount(ResourceKind::Gold), KILL_REWARD * 3);
    }
}
