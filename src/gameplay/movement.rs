//! Movement: entities walk straight toward a commanded goal and stop at the
//! arrive distance. The goal can chase an entity or head for a fixed point.

use avian2d::prelude::Collider;
use bevy::prelude::*;

use crate::third_party::surface_distance;
use crate::{GameSet, gameplay_running};

// === Components ===

/// Locomotion capability. Entities without this never move.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Movement {
    speed: f32,
}

impl Movement {
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self { speed }
    }

    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Buffs and debuffs funnel through here; speed never goes negative.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }
}

/// The current move order. Rewritten every frame by the decision loop.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MoveCommand {
    goal: Option<MoveGoal>,
    arrive_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum MoveGoal {
    /// Chase a (possibly moving) entity, measured surface-to-surface.
    Entity(Entity),
    /// Walk to a fixed point, measured center-to-point.
    Point(Vec2),
}

impl Default for MoveCommand {
    fn default() -> Self {
        Self::idle()
    }
}

impl MoveCommand {
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            goal: None,
            arrive_distance: 0.0,
        }
    }

    pub fn pursue(&mut self, target: Entity, arrive_distance: f32) {
        self.goal = Some(MoveGoal::Entity(target));
        self.arrive_distance = arrive_distance;
    }

    pub fn move_to(&mut self, point: Vec2, arrive_distance: f32) {
        self.goal = Some(MoveGoal::Point(point));
        self.arrive_distance = arrive_distance;
    }

    pub fn clear(&mut self) {
        self.goal = None;
    }

    #[must_use]
    pub const fn goal(&self) -> Option<MoveGoal> {
        self.goal
    }

    #[must_use]
    pub const fn arrive_distance(&self) -> f32 {
        self.arrive_distance
    }
}

// === Systems ===

/// Walks every commanded entity toward its goal, stopping at the arrive
/// distance. A chased entity that despawned clears the command.
fn apply_movement(
    time: Res<Time>,
    mut movers: Query<(&Movement, &mut MoveCommand, &mut Transform, &Collider)>,
    goals: Query<(&GlobalTransform, &Collider)>,
) {
    let delta = time.delta_secs();
    for (movement, mut command, mut transform, collider) in &mut movers {
        let Some(goal) = command.goal else {
            continue;
        };
        let current = transform.translation.truncate();

        // Distance used for the arrive check, and the point walked toward.
        let (destination, remaining) = match goal {
            MoveGoal::Entity(target) => {
                let Ok((target_pos, target_collider)) = goals.get(target) else {
                    command.clear();
                    continue;
                };
                let target_xy = target_pos.translation().xy();
                (
                    target_xy,
                    surface_distance(collider, current, target_collider, target_xy),
                )
            }
            MoveGoal::Point(point) => (point, current.distance(point)),
        };

        if remaining <= command.arrive_distance {
            continue;
        }

        let to_destination = destination - current;
        let span = to_destination.length();
        if span < f32::EPSILON {
            continue;
        }
        // Never step past the arrive ring.
        let step = (movement.speed * delta).min(remaining - command.arrive_distance);
        let dir = to_destination / span;
        transform.translation.x = dir.x.mul_add(step, transform.translation.x);
        transform.translation.y = dir.y.mul_add(step, transform.translation.y);
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Movement>().register_type::<MoveCommand>();

    app.add_systems(
        Update,
        apply_movement
            .in_set(GameSet::Movement)
            .run_if(gameplay_running),
    );
}
