//! Externally authored configuration: unit and building catalogs plus
//! starting resources.
//!
//! Everything in here is immutable for the lifetime of a session. Specs are
//! loaded once (in-code defaults, optionally overridden by a RON asset) and
//! handed to entities behind `Arc`s at spawn time; systems never re-resolve
//! configuration per tick.

use serde::{Deserialize, Serialize};

use crate::gameplay::ai::{AiProfile, TargetPolicy};
use crate::gameplay::economy::ResourceKind;

// === Attacks ===

/// Classification of an attack's delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Damage applied directly to the target on execution.
    Melee,
    /// Delivered from a distance, optionally via a projectile in flight.
    Ranged,
}

/// How a projectile travels to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPath {
    /// Homes on the target every tick, hits on arrival.
    Straight,
    /// Fixed-velocity arc toward the fire-time aim point; can miss.
    Ballistic,
}

/// Projectile parameters for a ranged attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpec {
    /// Travel speed in world units per second.
    pub speed: f32,
    pub flight: FlightPath,
}

/// One attack available to an entity. Immutable; per-attacker cooldown state
/// lives on the `Attacker` component, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackSpec {
    pub name: String,
    pub kind: AttackKind,
    pub damage: f32,
    /// Maximum surface-to-surface distance at which this attack connects.
    pub range: f32,
    /// Seconds between consecutive uses.
    pub cooldown: f32,
    /// `None` for melee attacks and for ranged attacks that resolve
    /// instantly without a projectile in flight.
    pub projectile: Option<ProjectileSpec>,
}

// === Units ===

/// Unit archetypes available to trainers and scenario setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Melee line infantry.
    Militia,
    /// Ranged unit firing ballistic arrows.
    Archer,
}

impl UnitKind {
    /// All unit kinds, for iteration.
    pub const ALL: &[Self] = &[Self::Militia, Self::Archer];
}

/// Full stat block for one unit kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    pub max_health: f32,
    /// Flat per-hit damage reduction.
    pub armor: f32,
    pub move_speed: f32,
    /// Collider radius; range checks are surface-to-surface.
    pub radius: f32,
    /// Perception radius for the target scanner.
    pub scan_radius: f32,
    /// Seconds between scans.
    pub scan_frequency: f32,
    pub attacks: Vec<AttackSpec>,
    pub profile: AiProfile,
}

// === Buildings ===

/// Building archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Trains militia on a timer.
    Barracks,
    /// Generates gold on a timer.
    GoldMine,
}

/// Per-level building stats. `cost` is what unlocking level 1 or upgrading
/// *to* this level deducts from the bank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingLevel {
    pub cost: u32,
    pub max_health: f32,
}

/// Passive resource generation attached to a building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSpec {
    pub resource: ResourceKind,
    pub amount_per_tick: u32,
    /// Seconds between ticks.
    pub interval_secs: f32,
}

/// Timed unit production attached to a building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainerSpec {
    pub unit: UnitKind,
    /// Seconds between units.
    pub interval_secs: f32,
}

/// Upgrade path and capabilities of one building kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub name: String,
    /// Level 1 first. Length is the max level.
    pub levels: Vec<BuildingLevel>,
    /// Collider half-extent (buildings are square).
    pub half_extent: f32,
    pub generator: Option<GeneratorSpec>,
    pub trainer: Option<TrainerSpec>,
}

// === Top-level config ===

/// Starting balances for the resource bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingResources {
    pub gold: u32,
    pub prestige: u32,
}

/// The whole session configuration. Loaded once, then treated as read-only.
#[derive(bevy::prelude::Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub starting_resources: StartingResources,
    pub units: std::collections::BTreeMap<UnitKind, UnitSpec>,
    pub buildings: std::collections::BTreeMap<BuildingKind, BuildingSpec>,
}

impl GameConfig {
    /// Parse a RON document into a config.
    ///
    /// # Errors
    /// Returns the RON parse error; the caller decides whether to fall back
    /// to [`GameConfig::default`].
    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    /// Check structural invariants the rest of the crate relies on, so a bad
    /// overlay is rejected once at load time instead of panicking mid-session.
    ///
    /// # Errors
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        for (kind, spec) in &self.units {
            if spec.max_health <= 0.0 {
                return Err(format!("{kind:?}: max_health must be positive"));
            }
            if spec.scan_frequency <= 0.0 {
                return Err(format!("{kind:?}: scan_frequency must be positive"));
            }
            if spec.attacks.is_empty() {
                return Err(format!("{kind:?}: needs at least one attack"));
            }
            for attack in &spec.attacks {
                if attack.cooldown <= 0.0 {
                    return Err(format!(
                        "{kind:?}: attack {:?} cooldown must be positive",
                        attack.name
                    ));
                }
            }
        }
        for (kind, spec) in &self.buildings {
            if spec.levels.is_empty() {
                return Err(format!("{kind:?}: needs at least one level"));
            }
            if let Some(generator) = &spec.generator
                && generator.interval_secs <= 0.0
            {
                return Err(format!("{kind:?}: generator interval must be positive"));
            }
            if let Some(trainer) = &spec.trainer {
                if trainer.interval_secs <= 0.0 {
                    return Err(format!("{kind:?}: trainer interval must be positive"));
                }
                if !self.units.contains_key(&trainer.unit) {
                    return Err(format!(
                        "{kind:?}: trains {:?}, which has no unit spec",
                        trainer.unit
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let militia = UnitSpec {
            name: "Militia".to_string(),
            max_health: 100.0,
            armor: 5.0,
            move_speed: 50.0,
            radius: 6.0,
            scan_radius: 160.0,
            scan_frequency: 0.5,
            attacks: vec![AttackSpec {
                name: "Sword".to_string(),
                kind: AttackKind::Melee,
                damage: 20.0,
                range: 8.0,
                cooldown: 1.0,
                projectile: None,
            }],
            profile: AiProfile {
                can_attack: true,
                can_assist: false,
                policy: TargetPolicy::Nearest,
            },
        };

        let archer = UnitSpec {
            name: "Archer".to_string(),
            max_health: 60.0,
            armor: 0.0,
            move_speed: 45.0,
            radius: 6.0,
            scan_radius: 220.0,
            scan_frequency: 0.5,
            attacks: vec![
                AttackSpec {
                    name: "Arrow".to_string(),
                    kind: AttackKind::Ranged,
                    damage: 12.0,
                    range: 120.0,
                    cooldown: 1.5,
                    projectile: Some(ProjectileSpec {
                        speed: 200.0,
                        flight: FlightPath::Ballistic,
                    }),
                },
                AttackSpec {
                    name: "Knife".to_string(),
                    kind: AttackKind::Melee,
                    damage: 6.0,
                    range: 8.0,
                    cooldown: 1.0,
                    projectile: None,
                },
            ],
            profile: AiProfile {
                can_attack: true,
                can_assist: false,
                policy: TargetPolicy::Scored {
                    destructible_bonus: 10.0,
                    distance_weight: 1.0,
                },
            },
        };

        let barracks = BuildingSpec {
            name: "Barracks".to_string(),
            levels: vec![
                BuildingLevel {
                    cost: 100,
                    max_health: 300.0,
                },
                BuildingLevel {
                    cost: 150,
                    max_health: 450.0,
                },
                BuildingLevel {
                    cost: 250,
                    max_health: 650.0,
                },
            ],
            half_extent: 24.0,
            generator: None,
            trainer: Some(TrainerSpec {
                unit: UnitKind::Militia,
                interval_secs: 3.0,
            }),
        };

        let gold_mine = BuildingSpec {
            name: "Gold Mine".to_string(),
            levels: vec![
                BuildingLevel {
                    cost: 50,
                    max_health: 150.0,
                },
                BuildingLevel {
                    cost: 120,
                    max_health: 220.0,
                },
            ],
            half_extent: 24.0,
            generator: Some(GeneratorSpec {
                resource: ResourceKind::Gold,
                amount_per_tick: 3,
                interval_secs: 1.0,
            }),
            trainer: None,
        };

        Self {
            starting_resources: StartingResources {
                gold: 200,
                prestige: 0,
            },
            units: [(UnitKind::Militia, militia), (UnitKind::Archer, archer)]
                .into_iter()
                .collect(),
            buildings: [
                (BuildingKind::Barracks, barracks),
                (BuildingKind::GoldMine, gold_mine),
            ]
            .into_iter()
            .collect(),
        }
    }
}
