//! Units: the spawn bundle and the catalog of shared unit specs.

use std::collections::HashMap;
use std::sync::Arc;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::GameState;
use crate::config::{AttackSpec, GameConfig, UnitKind, UnitSpec};
use crate::gameplay::ai::{ScannedTargets, StrategicTarget, TargetScanner};
use crate::gameplay::combat::{Attacker, Engagement, Health};
use crate::gameplay::movement::{MoveCommand, Movement};
use crate::gameplay::{CurrentTarget, Faction};

// === Components ===

/// Marker for mobile combat units.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Unit;

// === Resources ===

/// Shared unit specs, resolved once from [`GameConfig`]. Spawns hand out
/// `Arc` clones instead of copying stat blocks.
#[derive(Resource, Debug, Default, Clone)]
pub struct UnitCatalog {
    specs: HashMap<UnitKind, Arc<UnitSpec>>,
    attacks: HashMap<UnitKind, Arc<[AttackSpec]>>,
}

impl UnitCatalog {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let mut specs = HashMap::new();
        let mut attacks = HashMap::new();
        for (&kind, spec) in &config.units {
            attacks.insert(kind, Arc::from(spec.attacks.as_slice()));
            specs.insert(kind, Arc::new(spec.clone()));
        }
        Self { specs, attacks }
    }

    #[must_use]
    pub fn spec(&self, kind: UnitKind) -> Option<&Arc<UnitSpec>> {
        self.specs.get(&kind)
    }
}

// === Spawning ===

/// Spawns a fully wired unit of `kind` at `position`. The single source of
/// truth for the unit bundle; trainers and scenario setup both go through
/// here. Returns `None` (with a log) for a kind the config does not define.
pub fn spawn_unit(
    commands: &mut Commands,
    catalog: &UnitCatalog,
    kind: UnitKind,
    faction: Faction,
    position: Vec2,
) -> Option<Entity> {
    let Some(spec) = catalog.specs.get(&kind) else {
        warn!("no unit spec configured for {kind:?}");
        return None;
    };
    // Catalog invariant: specs and attacks share keys.
    let attacks = catalog.attacks.get(&kind)?;

    let entity = commands
        .spawn((
            Name::new(spec.name.clone()),
            Unit,
            faction,
            Health::with_armor(spec.max_health, spec.armor),
            Attacker::new(Arc::clone(attacks)),
            Engagement::default(),
            CurrentTarget(None),
            spec.profile,
            TargetScanner::new(spec.scan_radius, spec.scan_frequency),
            ScannedTargets::default(),
            StrategicTarget::default(),
            Movement::new(spec.move_speed),
            MoveCommand::default(),
            Collider::circle(spec.radius),
            (
                Transform::from_xyz(position.x, position.y, 0.0),
                DespawnOnExit(GameState::InGame),
            ),
        ))
        .id();
    Some(entity)
}

// === Plugin ===

fn build_catalog(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(UnitCatalog::new(&config));
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Unit>();

    app.init_resource::<UnitCatalog>();
    app.add_systems(PreStartup, build_catalog);
}
