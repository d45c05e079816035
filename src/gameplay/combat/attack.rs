//! Attack execution: cooldown bookkeeping, best-attack selection, and the
//! engage/disengage state machine.

use std::sync::Arc;

use avian2d::prelude::*;
use bevy::prelude::*;

use super::health::{Health, UnitDamaged, UnitDied, deal_damage};
use super::projectile::spawn_projectile;
use crate::config::{AttackKind, AttackSpec};
use crate::gameplay::Faction;
use crate::third_party::surface_distance;

/// Floor for the cooldown divisor in the damage-per-cooldown score, so a
/// zero-cooldown attack cannot produce an infinite score.
const MIN_SCORE_COOLDOWN: f32 = 0.01;

// === Components ===

/// Executes attacks from an immutable attack list, tracking one cooldown per
/// attack. Cooldowns count down every tick and reset to full on use.
#[derive(Component, Debug, Clone)]
pub struct Attacker {
    attacks: Arc<[AttackSpec]>,
    /// Seconds remaining per attack, parallel to `attacks`. Zero = ready.
    cooldowns: Vec<f32>,
}

impl Attacker {
    #[must_use]
    pub fn new(attacks: Arc<[AttackSpec]>) -> Self {
        let cooldowns = vec![0.0; attacks.len()];
        Self { attacks, cooldowns }
    }

    #[must_use]
    pub fn attacks(&self) -> &[AttackSpec] {
        &self.attacks
    }

    #[must_use]
    pub fn cooldown_remaining(&self, index: usize) -> f32 {
        self.cooldowns[index]
    }

    #[must_use]
    pub fn is_ready(&self, index: usize) -> bool {
        self.cooldowns[index] <= 0.0
    }

    /// Count all cooldowns down, flooring at zero.
    pub fn tick(&mut self, delta_secs: f32) {
        for remaining in &mut self.cooldowns {
            *remaining = (*remaining - delta_secs).max(0.0);
        }
    }

    /// Pick the best attack for a target at `distance` (surface-to-surface):
    /// among ready attacks whose range covers the distance, the one with the
    /// highest damage per cooldown second. Strict comparison, so the
    /// earliest-listed attack wins ties.
    #[must_use]
    pub fn select_attack(&self, distance: f32) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, attack) in self.attacks.iter().enumerate() {
            if !self.is_ready(index) || distance > attack.range {
                continue;
            }
            let score = attack.damage / attack.cooldown.max(MIN_SCORE_COOLDOWN);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Start the cooldown for an attack that was just executed.
    pub fn trigger(&mut self, index: usize) {
        self.cooldowns[index] = self.attacks[index].cooldown;
    }

    /// Longest attack range, used as the arrive distance when closing in.
    #[must_use]
    pub fn max_range(&self) -> f32 {
        self.attacks
            .iter()
            .map(|attack| attack.range)
            .fold(0.0, f32::max)
    }
}

/// Combat engagement state machine.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum Engagement {
    #[default]
    Disengaged,
    Engaging(Entity),
}

impl Engagement {
    pub fn engage(&mut self, target: Entity) {
        *self = Self::Engaging(target);
    }

    pub fn disengage(&mut self) {
        *self = Self::Disengaged;
    }

    #[must_use]
    pub const fn target(&self) -> Option<Entity> {
        match self {
            Self::Disengaged => None,
            Self::Engaging(target) => Some(*target),
        }
    }
}

// === Messages ===

/// An attack was executed. Animation/audio layers subscribe to this; the
/// core never depends on anyone listening.
#[derive(Message, Debug, Clone)]
pub struct AttackPerformed {
    pub attacker: Entity,
    pub target: Entity,
    pub attack: String,
}

// === Systems ===

/// Counts down every attacker's cooldowns, engaged or not.
pub(super) fn tick_attack_cooldowns(time: Res<Time>, mut attackers: Query<&mut Attacker>) {
    for mut attacker in &mut attackers {
        attacker.tick(time.delta_secs());
    }
}

/// Drives engaged attackers: auto-disengages from lost or dead targets, and
/// otherwise executes the best ready attack in range.
///
/// A target without a `Health` component is logged and the hit is lost, not
/// queued. The cooldown is still consumed, as firing happened.
pub(super) fn resolve_engagements(
    mut attackers: Query<(
        Entity,
        &mut Attacker,
        &mut Engagement,
        &GlobalTransform,
        &Collider,
    )>,
    mut targets: Query<(&GlobalTransform, &Collider, &Faction, Option<&mut Health>)>,
    mut commands: Commands,
    mut performed: MessageWriter<AttackPerformed>,
    mut damaged: MessageWriter<UnitDamaged>,
    mut died: MessageWriter<UnitDied>,
) {
    for (entity, mut attacker, mut engagement, transform, collider) in &mut attackers {
        let Engagement::Engaging(target) = *engagement else {
            continue;
        };

        // Target despawned mid-engagement; transient, not an error.
        let Ok((target_transform, target_collider, target_faction, target_health)) =
            targets.get_mut(target)
        else {
            engagement.disengage();
            continue;
        };
        if target_health.as_ref().is_some_and(|health| health.is_dead()) {
            engagement.disengage();
            continue;
        }

        let attacker_pos = transform.translation().xy();
        let target_pos = target_transform.translation().xy();
        let distance = surface_distance(collider, attacker_pos, target_collider, target_pos);

        let Some(index) = attacker.select_attack(distance) else {
            continue;
        };
        let attack = attacker.attacks()[index].clone();
        attacker.trigger(index);

        match (attack.kind, attack.projectile) {
            (AttackKind::Ranged, Some(projectile)) => {
                spawn_projectile(
                    &mut commands,
                    entity,
                    attacker_pos,
                    target,
                    target_pos,
                    attack.damage,
                    projectile,
                );
            }
            // Melee, and ranged attacks without a projectile, hit instantly.
            (AttackKind::Melee | AttackKind::Ranged, _) => {
                if let Some(mut health) = target_health {
                    deal_damage(
                        attack.damage,
                        Some(entity),
                        target,
                        *target_faction,
                        &mut health,
                        &mut damaged,
                        &mut died,
                    );
                } else {
                    warn!("attack {:?} hit {target:?}, which has no Health; damage lost", attack.name);
                }
            }
        }

        performed.write(AttackPerformed {
            attacker: entity,
            target,
            attack: attack.name,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn melee(name: &str, damage: f32, range: f32, cooldown: f32) -> AttackSpec {
        AttackSpec {
            name: name.to_string(),
            kind: AttackKind::Melee,
            damage,
            range,
            cooldown,
            projectile: None,
        }
    }

    fn attacker(attacks: Vec<AttackSpec>) -> Attacker {
        Attacker::new(Arc::from(attacks))
    }

    #[test]
    fn select_skips_attacks_on_cooldown() {
        let mut a = attacker(vec![
            melee("strong", 50.0, 10.0, 1.0),
            melee("weak", 10.0, 10.0, 1.0),
        ]);

        a.trigger(0);
        assert!(a.cooldown_remaining(0) > 0.0);

        // Only the weak attack is ready.
        assert_eq!(a.select_attack(5.0), Some(1));
    }

    #[test]
    fn select_never_returns_cooling_attack() {
        let mut a = attacker(vec![melee("only", 10.0, 10.0, 2.0)]);
        a.trigger(0);

        assert_eq!(a.select_attack(5.0), None);
    }

    #[test]
    fn select_prefers_higher_damage_per_cooldown() {
        let a = attacker(vec![
            melee("slow heavy", 40.0, 10.0, 4.0), // 10 dps
            melee("fast light", 15.0, 10.0, 1.0), // 15 dps
        ]);

        assert_eq!(a.select_attack(5.0), Some(1));
    }

    #[test]
    fn select_respects_range() {
        let a = attacker(vec![
            melee("short", 100.0, 2.0, 1.0),
            melee("long", 10.0, 50.0, 1.0),
        ]);

        assert_eq!(a.select_attack(30.0), Some(1));
        assert_eq!(a.select_attack(60.0), None);
    }

    #[test]
    fn select_breaks_ties_by_listing_order() {
        let a = attacker(vec![
            melee("first", 10.0, 10.0, 1.0),
            melee("twin", 10.0, 10.0, 1.0),
        ]);

        assert_eq!(a.select_attack(5.0), Some(0));
    }

    #[test]
    fn tick_floors_cooldowns_at_zero() {
        let mut a = attacker(vec![melee("poke", 5.0, 5.0, 1.0)]);
        a.trigger(0);
        a.tick(100.0);

        assert_eq!(a.cooldown_remaining(0), 0.0);
        assert!(a.is_ready(0));
    }

    #[test]
    fn max_range_spans_the_attack_list() {
        let a = attacker(vec![
            melee("short", 5.0, 8.0, 1.0),
            melee("long", 5.0, 120.0, 1.0),
        ]);
        assert_eq!(a.max_range(), 120.0);
    }

    #[test]
    fn engagement_transitions() {
        let mut engagement = Engagement::default();
        assert_eq!(engagement.target(), None);

        let target = Entity::PLACEHOLDER;
        engagement.engage(target);
        assert_eq!(engagement.target(), Some(target));

        engagement.disengage();
        assert_eq!(engagement, Engagement::Disengaged);
    }
}
