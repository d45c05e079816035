//! Economy: the resource bank, passive generator income, and kill rewards.

pub mod income;

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::GameState;
use crate::config::GameConfig;

pub use income::ResourceGenerator;

// === Resources ===

/// The currencies tracked by the bank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize,
)]
pub enum ResourceKind {
    Gold,
    Prestige,
}

/// The player's balances. All mutation goes through [`add`](Self::add) and
/// [`spend`](Self::spend); a balance can never go negative.
#[derive(Resource, Debug, Default, Clone, Reflect)]
#[reflect(Resource)]
pub struct ResourceBank {
    amounts: BTreeMap<ResourceKind, u32>,
}

impl ResourceBank {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let starting = config.starting_resources;
        Self {
            amounts: BTreeMap::from([
                (ResourceKind::Gold, starting.gold),
                (ResourceKind::Prestige, starting.prestige),
            ]),
        }
    }

    #[must_use]
    pub fn amount(&self, kind: ResourceKind) -> u32 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn can_afford(&self, kind: ResourceKind, cost: u32) -> bool {
        self.amount(kind) >= cost
    }

    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        *self.amounts.entry(kind).or_insert(0) += amount;
    }

    /// Deducts `cost` if the balance covers it. All or nothing: an
    /// unaffordable spend leaves the balance untouched and returns `false`.
    pub fn spend(&mut self, kind: ResourceKind, cost: u32) -> bool {
        let Some(balance) = self.amounts.get_mut(&kind) else {
            return cost == 0;
        };
        if *balance < cost {
            return false;
        }
        *balance -= cost;
        true
    }
}

// === Messages ===

/// A balance changed. Carries the new total; HUD-style consumers do not have
/// to re-derive it.
#[derive(Message, Debug, Clone, Copy)]
pub struct ResourceChanged {
    pub resource: ResourceKind,
    pub new_amount: u32,
}

// === Systems ===

fn reset_bank(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(ResourceBank::new(&config));
}

/// Broadcasts every balance after any frame that touched the bank.
fn broadcast_resource_changes(
    bank: Res<ResourceBank>,
    mut changes: MessageWriter<ResourceChanged>,
) {
    if !bank.is_changed() || bank.is_added() {
        return;
    }
    for (&resource, &new_amount) in &bank.amounts {
        changes.write(ResourceChanged {
            resource,
            new_amount,
        });
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<ResourceBank>()
        .init_resource::<ResourceBank>();

    app.add_message::<ResourceChanged>();

    app.add_systems(OnEnter(GameState::InGame), reset_bank);
    app.add_systems(Update, broadcast_resource_changes);

    income::plugin(app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bank_with_gold(gold: u32) -> ResourceBank {
        let mut bank = ResourceBank::default();
        bank.add(ResourceKind::Gold, gold);
        bank
    }

    #[test]
    fn unaffordable_spend_leaves_balance_untouched() {
        let mut bank = bank_with_gold(100);

        assert!(!bank.spend(ResourceKind::Gold, 150));
        assert_eq!(bank.amount(ResourceKind::Gold), 100);
    }

    #[test]
    fn affordable_spend_deducts() {
        let mut bank = bank_with_gold(100);

        assert!(bank.spend(ResourceKind::Gold, 50));
        assert_eq!(bank.amount(ResourceKind::Gold), 50);
    }

    #[test]
    fn exact_spend_empties_balance() {
        let mut bank = bank_with_gold(100);

        assert!(bank.spend(ResourceKind::Gold, 100));
        assert_eq!(bank.amount(ResourceKind::Gold), 0);
        assert!(!bank.spend(ResourceKind::Gold, 1));
    }

    #[test]
    fn kinds_are_tracked_independently() {
        let mut bank = bank_with_gold(100);
        bank.add(ResourceKind::Prestige, 3);

        assert!(bank.spend(ResourceKind::Gold, 100));
        assert_eq!(bank.amount(ResourceKind::Prestige), 3);
    }

    #[test]
    fn zero_spend_always_succeeds() {
        let mut bank = ResourceBank::default();
        assert!(bank.spend(ResourceKind::Gold, 0));
        assert_eq!(bank.amount(ResourceKind::Gold), 0);
    }

    #[test]
    fn bank_seeded_from_config() {
        let bank = ResourceBank::new(&GameConfig::default());
        assert_eq!(
            bank.amount(ResourceKind::Gold),
            GameConfig::default().starting_resources.gold
        );
    }
}
