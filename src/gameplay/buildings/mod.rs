//! Buildings: slot occupancy, the build/unlock/upgrade lifecycle, and timed
//! unit production.
//!
//! A slot carries at most one building instance. Building an order spawns a
//! locked shell; unlocking pays the level 1 cost and activates it; upgrading
//! pays the next level's cost and replaces the instance wholesale.

pub mod production;

use std::collections::HashMap;
use std::sync::Arc;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::GameState;
use crate::config::{BuildingKind, BuildingSpec, GameConfig};
use crate::gameplay::Faction;
use crate::gameplay::ai::InteractionRequest;
use crate::gameplay::combat::Health;
use crate::gameplay::economy::{ResourceBank, ResourceGenerator, ResourceKind};
use crate::{GameSet, gameplay_running};

pub use production::UnitTrainer;

// === Components ===

/// A fixed construction site. Holds at most one building instance.
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct BuildingSlot {
    pub building: Option<Entity>,
}

/// A building instance occupying a slot.
///
/// `level` is 1-based and never exceeds `spec.levels.len()`. A locked
/// building is an inert shell: no health, no generator, no trainer.
#[derive(Component, Debug, Clone)]
pub struct Building {
    pub kind: BuildingKind,
    pub spec: Arc<BuildingSpec>,
    pub level: usize,
    pub locked: bool,
    pub slot: Entity,
}

impl Building {
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.spec.levels.len()
    }

    #[must_use]
    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level()
    }
}

// === Resources ===

/// Shared building specs, resolved once from [`GameConfig`].
#[derive(Resource, Debug, Default, Clone)]
pub struct BuildingCatalog {
    specs: HashMap<BuildingKind, Arc<BuildingSpec>>,
}

impl BuildingCatalog {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            specs: config
                .buildings
                .iter()
                .map(|(&kind, spec)| (kind, Arc::new(spec.clone())))
                .collect(),
        }
    }

    #[must_use]
    pub fn spec(&self, kind: BuildingKind) -> Option<&Arc<BuildingSpec>> {
        self.specs.get(&kind)
    }
}

// === Messages ===

/// Place a locked shell of `kind` on an empty slot. Free; the money changes
/// hands at unlock.
#[derive(Message, Debug, Clone, Copy)]
pub struct BuildOrder {
    pub slot: Entity,
    pub kind: BuildingKind,
}

/// Pay the level 1 cost and activate the slot's building.
#[derive(Message, Debug, Clone, Copy)]
pub struct UnlockOrder {
    pub slot: Entity,
}

/// Pay the next level's cost and replace the slot's building with the
/// upgraded instance.
#[derive(Message, Debug, Clone, Copy)]
pub struct UpgradeOrder {
    pub slot: Entity,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct BuildingUnlocked {
    pub building: Entity,
    pub kind: BuildingKind,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct BuildingUpgraded {
    /// The replacement instance, not the despawned one.
    pub building: Entity,
    pub kind: BuildingKind,
    pub level: usize,
}

// === Systems ===

fn spawn_building_instance(
    commands: &mut Commands,
    kind: BuildingKind,
    spec: &Arc<BuildingSpec>,
    slot: Entity,
    faction: Faction,
    position: Vec2,
    level: usize,
    locked: bool,
) -> Entity {
    let mut entity = commands.spawn((
        Name::new(spec.name.clone()),
        Building {
            kind,
            spec: Arc::clone(spec),
            level,
            locked,
            slot,
        },
        faction,
        Collider::rectangle(spec.half_extent * 2.0, spec.half_extent * 2.0),
        Transform::from_xyz(position.x, position.y, 0.0),
        DespawnOnExit(GameState::InGame),
    ));
    if !locked {
        entity.insert(Health::new(spec.levels[level - 1].max_health));
        if let Some(generator) = &spec.generator {
            entity.insert(ResourceGenerator::from_spec(generator));
        }
        if let Some(trainer) = &spec.trainer {
            entity.insert(UnitTrainer::from_spec(trainer));
        }
    }
    entity.id()
}

/// Spawns locked shells on empty slots. Occupied slots and unknown kinds are
/// logged and skipped; nothing is spent.
fn handle_build_orders(
    mut orders: MessageReader<BuildOrder>,
    mut slots: Query<(&mut BuildingSlot, &Faction, &GlobalTransform)>,
    catalog: Res<BuildingCatalog>,
    mut commands: Commands,
) {
    for order in orders.read() {
        let Ok((mut slot, faction, transform)) = slots.get_mut(order.slot) else {
            warn!("build order for {:?} targets a non-slot entity", order.kind);
            continue;
        };
        if slot.building.is_some() {
            warn!("build order for {:?} on an occupied slot", order.kind);
            continue;
        }
        let Some(spec) = catalog.spec(order.kind) else {
            warn!("no building spec configured for {:?}", order.kind);
            continue;
        };
        let entity = spawn_building_instance(
            &mut commands,
            order.kind,
            spec,
            order.slot,
            *faction,
            transform.translation().xy(),
            1,
            true,
        );
        slot.building = Some(entity);
    }
}

/// Activates locked shells, all or nothing: the cost is only deducted when
/// every precondition holds.
fn handle_unlock_orders(
    mut orders: MessageReader<UnlockOrder>,
    slots: Query<&BuildingSlot>,
    mut buildings: Query<&mut Building>,
    mut bank: ResMut<ResourceBank>,
    mut commands: Commands,
    mut unlocked: MessageWriter<BuildingUnlocked>,
) {
    for order in orders.read() {
        let Some(entity) = slots.get(order.slot).ok().and_then(|slot| slot.building) else {
            warn!("unlock order for an empty or unknown slot");
            continue;
        };
        let Ok(mut building) = buildings.get_mut(entity) else {
            continue;
        };
        if !building.locked {
            warn!("unlock order for already unlocked {:?}", building.kind);
            continue;
        }
        let cost = building.spec.levels[0].cost;
        if !bank.spend(ResourceKind::Gold, cost) {
            warn!(
                "cannot afford to unlock {:?} (cost {cost}, gold {})",
                building.kind,
                bank.amount(ResourceKind::Gold)
            );
            continue;
        }

        building.locked = false;
        let mut entity_commands = commands.entity(entity);
        entity_commands.insert(Health::new(building.spec.levels[0].max_health));
        if let Some(generator) = &building.spec.generator {
            entity_commands.insert(ResourceGenerator::from_spec(generator));
        }
        if let Some(trainer) = &building.spec.trainer {
            entity_commands.insert(UnitTrainer::from_spec(trainer));
        }
        unlocked.write(BuildingUnlocked {
            building: entity,
            kind: building.kind,
        });
    }
}

/// Replaces a building with its next level. The old instance despawns and a
/// fresh one spawns at full health, so a damaged building heals by upgrading.
fn handle_upgrade_orders(
    mut orders: MessageReader<UpgradeOrder>,
    mut slots: Query<(&mut BuildingSlot, &Faction, &GlobalTransform)>,
    buildings: Query<&Building>,
    mut bank: ResMut<ResourceBank>,
    mut commands: Commands,
    mut upgraded: MessageWriter<BuildingUpgraded>,
) {
    for order in orders.read() {
        let Ok((mut slot, faction, transform)) = slots.get_mut(order.slot) else {
            warn!("upgrade order for a non-slot entity");
            continue;
        };
        let Some(entity) = slot.building else {
            warn!("upgrade order for an empty slot");
            continue;
        };
        let Ok(building) = buildings.get(entity) else {
            continue;
        };
        if building.locked {
            warn!("upgrade order for locked {:?}", building.kind);
            continue;
        }
        if building.is_max_level() {
            warn!("{:?} is already at max level {}", building.kind, building.level);
            continue;
        }
        // 1-based level: levels[level] is the next level's entry.
        let cost = building.spec.levels[building.level].cost;
        if !bank.spend(ResourceKind::Gold, cost) {
            warn!(
                "cannot afford to upgrade {:?} (cost {cost}, gold {})",
                building.kind,
                bank.amount(ResourceKind::Gold)
            );
            continue;
        }

        let next_level = building.level + 1;
        let kind = building.kind;
        let spec = Arc::clone(&building.spec);
        commands.entity(entity).despawn();
        let replacement = spawn_building_instance(
            &mut commands,
            kind,
            &spec,
            order.slot,
            *faction,
            transform.translation().xy(),
            next_level,
            false,
        );
        slot.building = Some(replacement);
        upgraded.write(BuildingUpgraded {
            building: replacement,
            kind,
            level: next_level,
        });
    }
}

/// Routes assist interactions at buildings: a locked building gets an unlock
/// order, an unlocked one an upgrade order.
fn handle_interaction_requests(
    mut requests: MessageReader<InteractionRequest>,
    buildings: Query<&Building>,
    mut unlock: MessageWriter<UnlockOrder>,
    mut upgrade: MessageWriter<UpgradeOrder>,
) {
    for request in requests.read() {
        let Ok(building) = buildings.get(request.target) else {
            continue;
        };
        if building.locked {
            unlock.write(UnlockOrder {
                slot: building.slot,
            });
        } else {
            upgrade.write(UpgradeOrder {
                slot: building.slot,
            });
        }
    }
}

// === Observers ===

/// Keeps slot occupancy honest when a building despawns for any reason.
/// Upgrades repoint the slot before the old instance despawns, so the
/// equality guard leaves replacements alone.
fn clear_slot_on_building_removed(
    remove: On<Remove, Building>,
    buildings: Query<&Building>,
    mut slots: Query<&mut BuildingSlot>,
) {
    let Ok(building) = buildings.get(remove.entity) else {
        return;
    };
    let Ok(mut slot) = slots.get_mut(building.slot) else {
        return;
    };
    if slot.building == Some(remove.entity) {
        slot.building = None;
    }
}

// === Plugin ===

fn build_catalog(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(BuildingCatalog::new(&config));
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BuildingSlot>();

    app.init_resource::<BuildingCatalog>();
    app.add_systems(PreStartup, build_catalog);

    app.add_message::<BuildOrder>()
        .add_message::<UnlockOrder>()
        .add_message::<UpgradeOrder>()
        .add_message::<BuildingUnlocked>()
        .add_message::<BuildingUpgraded>();

    app.add_observer(clear_slot_on_building_removed);

    // Interactions feed orders, orders resolve in lifecycle order, and
    // production runs on whatever ended up unlocked.
    app.add_systems(
        Update,
        (
            handle_interaction_requests,
            handle_build_orders,
            handle_unlock_orders,
            handle_upgrade_orders,
        )
            .chain()
            .in_set(GameSet::Production)
            .run_if(gameplay_running),
    );

    production::plugin(app);
}
