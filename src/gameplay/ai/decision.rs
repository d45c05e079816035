//! The decision loop: turns each entity's scan results into an engagement, an
//! assist, or a fallback move order, and reports target transitions.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::{AiProfile, ScannedTargets, TargetPolicy};
use crate::gameplay::combat::{Attacker, Engagement, Health};
use crate::gameplay::movement::MoveCommand;
use crate::gameplay::{CurrentTarget, Faction};
use crate::third_party::surface_distance;
use crate::{GameSet, gameplay_running};

/// Surface distance within which a friendly target can be interacted with;
/// also the arrive distance when closing in on one.
const INTERACT_RANGE: f32 = 16.0;

/// Arrive distance for strategic fallback movement.
const STRATEGIC_ARRIVE: f32 = 4.0;

// === Components ===

/// Where an entity drifts when it has nothing scanned worth acting on.
/// `None` means hold position.
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct StrategicTarget(pub Option<Vec2>);

// === Messages ===

/// The decision loop settled on a new target. Fired exactly once per
/// transition, whether or not the scan list changed underneath it.
#[derive(Message, Debug, Clone, Copy)]
pub struct TargetAcquired {
    pub seeker: Entity,
    pub target: Entity,
}

/// The previous target was dropped: it died, despawned, left perception, or
/// was outranked by a better candidate. Fired exactly once per transition.
#[derive(Message, Debug, Clone, Copy)]
pub struct TargetLost {
    pub seeker: Entity,
    pub target: Entity,
}

/// An assist-capable entity is in range of its friendly target. Fired every
/// tick while that holds; consumers decide what the interaction means
/// (buildings try unlock, then upgrade) and reject what they cannot honor.
#[derive(Message, Debug, Clone, Copy)]
pub struct InteractionRequest {
    pub interactor: Entity,
    pub target: Entity,
}

// === Systems ===

/// Ranks a hostile candidate list per the entity's policy. Strict comparisons
/// throughout, so the first-scanned candidate wins ties.
fn pick_hostile(
    policy: TargetPolicy,
    candidates: &[(Entity, f32, bool)],
) -> Option<Entity> {
    match policy {
        TargetPolicy::Nearest => candidates
            .iter()
            .fold(None, |best: Option<(Entity, f32)>, &(entity, dist, _)| {
                if best.is_none_or(|(_, d)| dist < d) {
                    Some((entity, dist))
                } else {
                    best
                }
            })
            .map(|(entity, _)| entity),
        TargetPolicy::Scored {
            destructible_bonus,
            distance_weight,
        } => candidates
            .iter()
            .fold(
                None,
                |best: Option<(Entity, f32)>, &(entity, dist, destructible)| {
                    let bonus = if destructible { destructible_bonus } else { 0.0 };
                    let score = dist.mul_add(-distance_weight, bonus);
                    if best.is_none_or(|(_, s)| score > s) {
                        Some((entity, score))
                    } else {
                        best
                    }
                },
            )
            .map(|(entity, _)| entity),
    }
}

/// Runs once per frame for every profiled entity. Hostiles always dominate
/// friendlies: assists only happen when nothing hostile was scanned.
///
/// Target transitions are reported off the selection itself, so a retarget
/// within an unchanged scan list still fires its lost/acquired pair.
fn decide(
    mut seekers: Query<(
        Entity,
        &Faction,
        &GlobalTransform,
        &Collider,
        &AiProfile,
        &ScannedTargets,
        &mut CurrentTarget,
        &mut Engagement,
        &mut MoveCommand,
        Option<&Attacker>,
        Option<&StrategicTarget>,
    )>,
    targets: Query<(&Faction, &GlobalTransform, &Collider, Option<&Health>)>,
    mut interactions: MessageWriter<InteractionRequest>,
    mut acquired: MessageWriter<TargetAcquired>,
    mut lost: MessageWriter<TargetLost>,
) {
    for (
        entity,
        faction,
        transform,
        collider,
        profile,
        scanned,
        mut current_target,
        mut engagement,
        mut move_command,
        attacker,
        strategic,
    ) in &mut seekers
    {
        let my_pos = transform.translation().xy();

        // Partition the scan into live hostiles and friendlies, with the
        // surface distance computed once per candidate.
        let mut hostiles: Vec<(Entity, f32, bool)> = Vec::new();
        let mut friendlies: Vec<(Entity, f32)> = Vec::new();
        for &candidate in &scanned.0 {
            let Ok((candidate_faction, candidate_pos, candidate_collider, health)) =
                targets.get(candidate)
            else {
                continue;
            };
            if health.is_some_and(Health::is_dead) {
                continue;
            }
            let dist = surface_distance(
                collider,
                my_pos,
                candidate_collider,
                candidate_pos.translation().xy(),
            );
            if faction.is_hostile_to(*candidate_faction) {
                hostiles.push((candidate, dist, health.is_some()));
            } else {
                friendlies.push((candidate, dist));
            }
        }

        let previous = current_target.0;

        let selected = if profile.can_attack
            && let Some(target) = pick_hostile(profile.policy, &hostiles)
        {
            engagement.engage(target);
            let arrive = attacker.map_or(0.0, Attacker::max_range);
            move_command.pursue(target, arrive);
            Some(target)
        } else if profile.can_assist
            && let Some((target, dist)) = friendlies
                .iter()
                .copied()
                .fold(None, |best: Option<(Entity, f32)>, (e, dist)| {
                    if best.is_none_or(|(_, d)| dist < d) {
                        Some((e, dist))
                    } else {
                        best
                    }
                })
        {
            engagement.disengage();
            move_command.pursue(target, INTERACT_RANGE);
            // Requested every tick while in range. A rejected order is simply
            // retried next tick, so recovery needs no extra machinery.
            if dist <= INTERACT_RANGE {
                interactions.write(InteractionRequest {
                    interactor: entity,
                    target,
                });
            }
            Some(target)
        } else {
            // Nothing actionable: fall back to the strategic heading.
            engagement.disengage();
            match strategic.and_then(|s| s.0) {
                Some(point) => move_command.move_to(point, STRATEGIC_ARRIVE),
                None => move_command.clear(),
            }
            None
        };

        current_target.0 = selected;
        if previous != selected {
            if let Some(target) = previous {
                lost.write(TargetLost {
                    seeker: entity,
                    target,
                });
            }
            if let Some(target) = selected {
                acquired.write(TargetAcquired {
                    seeker: entity,
                    target,
                });
            }
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<StrategicTarget>();

    app.add_message::<InteractionRequest>()
        .add_message::<TargetAcquired>()
        .add_message::<TargetLost>();

    app.add_systems(Update, decide.in_set(GameSet::Ai).run_if(gameplay_running));
}
