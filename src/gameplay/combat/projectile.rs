//! Projectile flight: straight homing shots and ballistic arcs.
//!
//! Straight projectiles track their target and snap to it on overshoot.
//! Ballistic projectiles commit to the aim point captured at launch and
//! simulate a synthetic height axis, so a target that moves away makes the
//! shot land in the dirt.

use bevy::prelude::*;

use super::health::{Health, UnitDamaged, UnitDied, deal_damage};
use crate::GameState;
use crate::config::{FlightPath, ProjectileSpec};
use crate::gameplay::Faction;

/// Gravity for the synthetic height axis (units per second squared).
const GRAVITY: f32 = 300.0;

/// A ballistic shot landing within this radius of its live target hits.
const HIT_RADIUS: f32 = 12.0;

/// Projectiles outside this half-extent are despawned as a safety net
/// against degenerate configs (e.g. zero horizontal speed).
const OUT_OF_BOUNDS: f32 = 4096.0;

// === Components ===

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    /// Who fired it, attributed on the damage message.
    pub attacker: Entity,
    pub target: Entity,
    pub damage: f32,
    /// Target position at launch. Ballistic shots land here regardless of
    /// where the target went.
    pub aim: Vec2,
    pub motion: ProjectileMotion,
}

#[derive(Debug, Clone, Reflect)]
pub enum ProjectileMotion {
    /// Homes on the target's current position.
    Straight { speed: f32 },
    /// Flies toward the fixed aim point while the height axis runs a
    /// launch-to-ground parabola.
    Ballistic {
        horizontal_speed: f32,
        height: f32,
        vertical_speed: f32,
    },
}

/// Launch speed along the height axis that brings a ballistic shot back to
/// the ground exactly as it covers `distance` at `horizontal_speed`.
#[must_use]
pub(crate) fn ballistic_launch_speed(distance: f32, horizontal_speed: f32) -> f32 {
    let flight_time = distance / horizontal_speed.max(f32::EPSILON);
    0.5 * GRAVITY * flight_time
}

/// Spawns the projectile for a ranged attack at the attacker's position.
pub(super) fn spawn_projectile(
    commands: &mut Commands,
    attacker: Entity,
    origin: Vec2,
    target: Entity,
    target_pos: Vec2,
    damage: f32,
    spec: ProjectileSpec,
) {
    let motion = match spec.flight {
        FlightPath::Straight => ProjectileMotion::Straight { speed: spec.speed },
        FlightPath::Ballistic => ProjectileMotion::Ballistic {
            horizontal_speed: spec.speed,
            height: 0.0,
            vertical_speed: ballistic_launch_speed(origin.distance(target_pos), spec.speed),
        },
    };
    commands.spawn((
        Name::new("Projectile"),
        Projectile {
            attacker,
            target,
            damage,
            aim: target_pos,
            motion,
        },
        Transform::from_xyz(origin.x, origin.y, 0.0),
        GlobalTransform::from(Transform::from_xyz(origin.x, origin.y, 0.0)),
        DespawnOnExit(GameState::InGame),
    ));
}

// === Systems ===

/// Advances every projectile one tick and resolves arrivals.
///
/// Straight: despawns harmlessly if the target is gone, otherwise homes and
/// damages on arrival. Ballistic: flies to the aim point, and on ground
/// contact hits the target only if it is still within [`HIT_RADIUS`].
pub(super) fn fly_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
    mut targets: Query<(&GlobalTransform, &Faction, &mut Health), Without<Projectile>>,
    mut damaged: MessageWriter<UnitDamaged>,
    mut died: MessageWriter<UnitDied>,
) {
    let delta = time.delta_secs();
    for (entity, mut projectile, mut transform) in &mut projectiles {
        let position = transform.translation.truncate();
        if position.x.abs() > OUT_OF_BOUNDS || position.y.abs() > OUT_OF_BOUNDS {
            commands.entity(entity).despawn();
            continue;
        }

        match projectile.motion {
            ProjectileMotion::Straight { speed } => {
                // Target gone; the shot fizzles.
                let Ok((target_transform, target_faction, mut health)) =
                    targets.get_mut(projectile.target)
                else {
                    commands.entity(entity).despawn();
                    continue;
                };

                let target_xy = target_transform.translation().truncate();
                let to_target = target_xy - position;
                let distance = to_target.length();
                let step = speed * delta;

                if step >= distance {
                    deal_damage(
                        projectile.damage,
                        Some(projectile.attacker),
                        projectile.target,
                        *target_faction,
                        &mut health,
                        &mut damaged,
                        &mut died,
                    );
                    commands.entity(entity).despawn();
                } else {
                    let dir = to_target / distance;
                    transform.translation.x = dir.x.mul_add(step, transform.translation.x);
                    transform.translation.y = dir.y.mul_add(step, transform.translation.y);
                }
            }
            ProjectileMotion::Ballistic {
                horizontal_speed,
                height,
                vertical_speed,
            } => {
                let aim = projectile.aim;
                let to_aim = aim - position;
                let distance = to_aim.length();
                let step = horizontal_speed * delta;
                if step >= distance {
                    transform.translation.x = aim.x;
                    transform.translation.y = aim.y;
                } else {
                    let dir = to_aim / distance;
                    transform.translation.x = dir.x.mul_add(step, transform.translation.x);
                    transform.translation.y = dir.y.mul_add(step, transform.translation.y);
                }

                let new_height = vertical_speed.mul_add(delta, height);
                let new_vertical_speed = GRAVITY.mul_add(-delta, vertical_speed);

                // Ground contact ends the flight, hit or miss.
                if new_height <= 0.0 && new_vertical_speed < 0.0 {
                    let impact = transform.translation.truncate();
                    if let Ok((target_transform, target_faction, mut health)) =
                        targets.get_mut(projectile.target)
                        && target_transform.translation().truncate().distance(impact) <= HIT_RADIUS
                    {
                        deal_damage(
                            projectile.damage,
                            Some(projectile.attacker),
                            projectile.target,
                            *target_faction,
                            &mut health,
                            &mut damaged,
                            &mut died,
                        );
                    }
                    commands.entity(entity).despawn();
                } else {
                    projectile.motion = ProjectileMotion::Ballistic {
                        horizontal_speed,
                        height: new_height,
                        vertical_speed: new_vertical_speed,
                    };
                }
            }
        }
    }
}
