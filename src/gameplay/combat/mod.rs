//! Combat: health and armor, attack selection and execution, projectile
//! flight, and death cleanup.

use bevy::prelude::*;

use crate::{GameSet, gameplay_running};

pub mod attack;
pub mod death;
pub mod health;
pub mod projectile;

pub use attack::{AttackPerformed, Attacker, Engagement};
pub use death::DeathCheck;
pub use health::{Health, Regeneration, UnitDamaged, UnitDied, UnitHealed, deal_damage};
pub use projectile::Projectile;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((health::plugin, death::plugin));

    app.register_type::<Engagement>().register_type::<Projectile>();

    app.add_message::<AttackPerformed>();

    // Combat resolves as cooldowns → attacks → projectile flight.
    // chain_ignore_deferred so a projectile spawned this frame does not also
    // fly this frame (prevents instant-hit invisible projectiles).
    app.add_systems(
        Update,
        (
            attack::tick_attack_cooldowns,
            attack::resolve_engagements,
            projectile::fly_projectiles,
        )
            .chain_ignore_deferred()
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
}
