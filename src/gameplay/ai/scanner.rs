//! Periodic proximity scanning. Each scanner refreshes its perception list on
//! its own cadence; the decision loop reads the list and reports target
//! transitions.

use bevy::prelude::*;

use crate::gameplay::combat::Health;
use crate::{GameSet, gameplay_running};

// === Components ===

/// Scans for destructible entities within `radius` (center-to-center) every
/// time the timer fires. The first scan happens on the first tick after
/// spawning, so fresh units react immediately.
#[derive(Component, Debug, Reflect)]
#[reflect(Component)]
pub struct TargetScanner {
    pub radius: f32,
    pub timer: Timer,
    primed: bool,
}

impl TargetScanner {
    #[must_use]
    pub fn new(radius: f32, interval_secs: f32) -> Self {
        Self {
            radius,
            timer: Timer::from_seconds(interval_secs, TimerMode::Repeating),
            primed: false,
        }
    }
}

/// Entities seen by the most recent scan, in scan order. Both factions are
/// listed; the decision loop partitions by hostility.
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct ScannedTargets(pub Vec<Entity>);

// === Systems ===

/// Refreshes due scanners: collects live destructible entities within radius,
/// excluding the scanner itself.
fn scan_for_targets(
    time: Res<Time>,
    mut scanners: Query<(
        Entity,
        &GlobalTransform,
        &mut TargetScanner,
        &mut ScannedTargets,
    )>,
    candidates: Query<(Entity, &GlobalTransform, &Health)>,
) {
    for (entity, transform, mut scanner, mut scanned) in &mut scanners {
        scanner.timer.tick(time.delta());
        if scanner.primed && !scanner.timer.just_finished() {
            continue;
        }
        scanner.primed = true;

        let my_pos = transform.translation().xy();
        let radius = scanner.radius;
        scanned.0 = candidates
            .iter()
            .filter(|&(candidate, candidate_pos, health)| {
                candidate != entity
                    && !health.is_dead()
                    && candidate_pos.translation().xy().distance(my_pos) <= radius
            })
            .map(|(candidate, _, _)| candidate)
            .collect();
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<TargetScanner>()
        .register_type::<ScannedTargets>();

    app.add_systems(
        Update,
        scan_for_targets
            .in_set(GameSet::Scan)
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::nearly_expire_timer;
    use pretty_assertions::assert_eq;

    fn create_scanner_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, scan_for_targets);
        app.update(); // Initialize time (first frame delta=0)
        app
    }

    fn spawn_scanner(world: &mut World, x: f32, radius: f32) -> Entity {
        world
            .spawn((
                Health::new(100.0),
                TargetScanner::new(radius, 0.5),
                ScannedTargets::default(),
                Transform::from_xyz(x, 100.0, 0.0),
                GlobalTransform::from(Transform::from_xyz(x, 100.0, 0.0)),
            ))
            .id()
    }

    fn spawn_body(world: &mut World, x: f32, health: Health) -> Entity {
        world
            .spawn((
                health,
                Transform::from_xyz(x, 100.0, 0.0),
                GlobalTransform::from(Transform::from_xyz(x, 100.0, 0.0)),
            ))
            .id()
    }

    #[test]
    fn first_scan_happens_immediately() {
        let mut app = create_scanner_test_app();

        let scanner = spawn_scanner(app.world_mut(), 100.0, 200.0);
        let body = spawn_body(app.world_mut(), 150.0, Health::new(50.0));

        // One update, far less than the 0.5s interval.
        app.update();

        let scanned = app.world().get::<ScannedTargets>(scanner).unwrap();
        assert_eq!(scanned.0, vec![body]);
    }

    #[test]
    fn scan_excludes_self_dead_and_distant() {
        let mut app = create_scanner_test_app();

        let scanner = spawn_scanner(app.world_mut(), 100.0, 200.0);
        let mut dead = Health::new(50.0);
        dead.apply_damage(50.0);
        let _corpse = spawn_body(app.world_mut(), 150.0, dead);
        let _far = spawn_body(app.world_mut(), 1_000.0, Health::new(50.0));
        let alive = spawn_body(app.world_mut(), 180.0, Health::new(50.0));

        app.update();

        let scanned = app.world().get::<ScannedTargets>(scanner).unwrap();
        assert_eq!(scanned.0, vec![alive]);
    }

    #[test]
    fn rescan_drops_despawned_target() {
        let mut app = create_scanner_test_app();

        let scanner = spawn_scanner(app.world_mut(), 100.0, 200.0);
        let body = spawn_body(app.world_mut(), 150.0, Health::new(50.0));

        app.update();
        assert_eq!(
            app.world().get::<ScannedTargets>(scanner).unwrap().0,
            vec![body]
        );

        app.world_mut().despawn(body);
        {
            let mut s = app.world_mut().get_mut::<TargetScanner>(scanner).unwrap();
            nearly_expire_timer(&mut s.timer);
        }
        app.update();

        let scanned = app.world().get::<ScannedTargets>(scanner).unwrap();
        assert!(scanned.0.is_empty());
    }

    #[test]
    fn no_rescan_between_timer_ticks() {
        let mut app = create_scanner_test_app();

        let scanner = spawn_scanner(app.world_mut(), 100.0, 200.0);
        app.update(); // primes the scanner with an empty field

        // A newcomer appears, but the 0.5s interval has not elapsed.
        let _body = spawn_body(app.world_mut(), 150.0, Health::new(50.0));
        app.update();

        let scanned = app.world().get::<ScannedTargets>(scanner).unwrap();
        assert!(scanned.0.is_empty());
    }
}
