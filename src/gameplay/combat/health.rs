//! Hit points, armor mitigation, and the damage/death notification path.
//!
//! Every damage source in the crate funnels through [`deal_damage`] so
//! mitigation, clamping, and the exactly-once death broadcast live in one
//! place.

use bevy::prelude::*;

use crate::gameplay::Faction;
use crate::{GameSet, gameplay_running};

/// Minimum health delta for a heal to count as an actual change.
const HEAL_EPSILON: f32 = 1e-4;

// === Components ===

/// Mutable life state of a destructible entity.
///
/// `current` never leaves `[0, max]`, and the alive→dead transition is
/// one-way: once `dead` is set, damage and healing are no-ops.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Health {
    current: f32,
    max: f32,
    /// Flat per-hit damage reduction.
    armor: f32,
    dead: bool,
}

/// What a call to [`Health::apply_damage`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Damage landed; the entity survives.
    Damaged { mitigated: f32 },
    /// Damage landed and drove health to zero. Reported exactly once.
    Died { mitigated: f32 },
    /// The entity was already dead; nothing happened.
    AlreadyDead,
}

impl Health {
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self::with_armor(max, 0.0)
    }

    #[must_use]
    pub fn with_armor(max: f32, armor: f32) -> Self {
        Self {
            current: max,
            max,
            armor,
            dead: false,
        }
    }

    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    #[must_use]
    pub const fn armor(&self) -> f32 {
        self.armor
    }

    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Apply `raw` damage after armor mitigation (`max(raw - armor, 0)`).
    ///
    /// No-op when already dead. The `Died` outcome is produced exactly once
    /// per entity no matter how much overkill follows.
    pub fn apply_damage(&mut self, raw: f32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::AlreadyDead;
        }

        let mitigated = (raw - self.armor).max(0.0);
        self.current = (self.current - mitigated).clamp(0.0, self.max);

        if self.current <= 0.0 {
            self.dead = true;
            DamageOutcome::Died { mitigated }
        } else {
            DamageOutcome::Damaged { mitigated }
        }
    }

    /// Restore health, clamped to `max`. No-op when dead.
    ///
    /// Returns whether the value actually changed (epsilon-guarded), so
    /// callers only broadcast real changes.
    pub fn heal(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }

        let previous = self.current;
        self.current = (self.current + amount).clamp(0.0, self.max);
        (self.current - previous).abs() > HEAL_EPSILON
    }
}

/// Passive health regeneration in hit points per second.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Regeneration(pub f32);

// === Messages ===

/// A unit (or building) took damage. `amount` is post-mitigation.
#[derive(Message, Debug, Clone, Copy)]
pub struct UnitDamaged {
    /// Damage source, if still known (projectiles may outlive their shooter).
    pub attacker: Option<Entity>,
    pub victim: Entity,
    pub amount: f32,
}

/// A destructible entity died. Fired exactly once per entity.
#[derive(Message, Debug, Clone, Copy)]
pub struct UnitDied {
    pub entity: Entity,
    pub faction: Faction,
}

/// Health rose through healing. Only fired when the value actually moved.
#[derive(Message, Debug, Clone, Copy)]
pub struct UnitHealed {
    pub entity: Entity,
    pub current: f32,
    pub max: f32,
}

// === Helpers ===

/// The single damage entry point: mitigates, mutates, and broadcasts.
pub fn deal_damage(
    raw: f32,
    attacker: Option<Entity>,
    victim: Entity,
    victim_faction: Faction,
    health: &mut Health,
    damaged: &mut MessageWriter<UnitDamaged>,
    died: &mut MessageWriter<UnitDied>,
) {
    match health.apply_damage(raw) {
        DamageOutcome::AlreadyDead => {}
        DamageOutcome::Damaged { mitigated } => {
            damaged.write(UnitDamaged {
                attacker,
                victim,
                amount: mitigated,
            });
        }
        DamageOutcome::Died { mitigated } => {
            damaged.write(UnitDamaged {
                attacker,
                victim,
                amount: mitigated,
            });
            died.write(UnitDied {
                entity: victim,
                faction: victim_faction,
            });
        }
    }
}

// === Systems ===

/// Ticks [`Regeneration`] and broadcasts real health changes.
fn apply_regeneration(
    time: Res<Time>,
    mut entities: Query<(Entity, &Regeneration, &mut Health)>,
    mut healed: MessageWriter<UnitHealed>,
) {
    for (entity, regen, mut health) in &mut entities {
        if health.heal(regen.0 * time.delta_secs()) {
            healed.write(UnitHealed {
                entity,
                current: health.current(),
                max: health.max(),
            });
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Health>().register_type::<Regeneration>();

    app.add_message::<UnitDamaged>()
        .add_message::<UnitDied>()
        .add_message::<UnitHealed>();

    app.add_systems(
        Update,
        apply_regeneration
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn armor_mitigates_flat_per_hit() {
        let mut health = Health::with_armor(100.0, 5.0);

        let outcome = health.apply_damage(20.0);

        assert_eq!(outcome, DamageOutcome::Damaged { mitigated: 15.0 });
        assert_eq!(health.current(), 85.0);
    }

    #[test]
    fn overkill_clamps_to_zero_and_dies_once() {
        let mut health = Health::with_armor(100.0, 5.0);

        health.apply_damage(20.0); // → 85
        let outcome = health.apply_damage(90.0); // max(90-5, 0) = 85 → 0

        assert_eq!(outcome, DamageOutcome::Died { mitigated: 85.0 });
        assert_eq!(health.current(), 0.0);
        assert!(health.is_dead());

        // Further hits after death are no-ops, with no second death report.
        assert_eq!(health.apply_damage(50.0), DamageOutcome::AlreadyDead);
        assert_eq!(health.current(), 0.0);
    }

    #[test]
    fn armor_cannot_heal_through_negative_damage() {
        let mut health = Health::with_armor(100.0, 30.0);
        health.apply_damage(50.0); // → 80

        let outcome = health.apply_damage(10.0); // max(10-30, 0) = 0

        assert_eq!(outcome, DamageOutcome::Damaged { mitigated: 0.0 });
        assert_eq!(health.current(), 80.0);
    }

    #[test]
    fn heal_clamps_to_max() {
        let mut health = Health::new(100.0);
        health.apply_damage(30.0);

        assert!(health.heal(1000.0));
        assert_eq!(health.current(), 100.0);
    }

    #[test]
    fn heal_at_full_health_reports_no_change() {
        let mut health = Health::new(100.0);
        assert!(!health.heal(25.0));
    }

    #[test]
    fn heal_on_dead_entity_is_noop() {
        let mut health = Health::new(50.0);
        health.apply_damage(50.0);
        assert!(health.is_dead());

        assert!(!health.heal(25.0));
        assert_eq!(health.current(), 0.0);
    }

    #[test]
    fn health_never_leaves_bounds_under_damage_sequences() {
        let mut health = Health::with_armor(100.0, 2.0);
        for raw in [0.0, 1.0, 37.5, 200.0, 5.0, 80.0] {
            health.apply_damage(raw);
            assert!(health.current() >= 0.0);
            assert!(health.current() <= health.max());
        }
        // Dead by now; value pinned at zero.
        assert!(health.is_dead());
        assert_eq!(health.current(), 0.0);
    }

    mod integration {
        use super::*;
        use pretty_assertions::assert_eq;

        fn create_regen_test_app() -> App {
            let mut app = App::new();
            app.add_plugins(MinimalPlugins);
            // Deterministic frame delta; back-to-back updates otherwise
            // yield wall-clock deltas too small to cap regen at max.
            app.insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
                std::time::Duration::from_millis(16),
            ));
            app.add_message::<UnitHealed>();
            app.add_systems(Update, apply_regeneration);
            app.update(); // Initialize time (first frame delta=0)
            app
        }

        #[test]
        fn regeneration_heals_damaged_entity() {
            let mut app = create_regen_test_app();

            let mut health = Health::new(100.0);
            health.apply_damage(50.0);
            let entity = app
                .world_mut()
                .spawn((health, Regeneration(100_000.0)))
                .id();

            app.update();

            // Huge regen rate: even a tiny wall-clock delta caps it at max.
            let health = app.world().get::<Health>(entity).unwrap();
            assert_eq!(health.current(), 100.0);
        }

        #[test]
        fn regeneration_skips_dead_entities() {
            let mut app = create_regen_test_app();

            let mut health = Health::new(100.0);
            health.apply_damage(100.0);
            let entity = app
                .world_mut()
                .spawn((health, Regeneration(100_000.0)))
                .id();

            app.update();

            let health = app.world().get::<Health>(entity).unwrap();
            assert_eq!(health.current(), 0.0);
            assert!(health.is_dead());
        }
    }
}
