#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat resolution: volley geometry, damage rolls, projectile hits, contact
//! damage, rewards, and experience progression.
//!
//! Everything here is pure bookkeeping over values owned by the caller. The
//! world decides which overlaps happen and hands the affected lifecycles to
//! these helpers, which report the outcome through [`Event`] values.
//!
//! [`Event`]: horde_core::Event

use horde_core::Vec2;
use rand::Rng;

mod contact;
mod progression;
mod projectile;
mod rewards;
mod weapon;

pub use contact::ContactCooldown;
pub use progression::Progression;
pub use projectile::{HitReport, Projectile, ProjectileDisposition};
pub use rewards::{payout, Reward};
pub use weapon::{ProjectileLaunch, Weapon};

/// Damage of a single shot after the critical roll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageRoll {
    /// Damage carried by the shot.
    pub damage: f32,
    /// Whether the critical multiplier was applied.
    pub critical: bool,
}

/// Rolls the damage of one shot.
///
/// With probability `crit_chance` the attack power is multiplied by
/// `crit_multiplier` and the shot is flagged critical.
pub fn roll_damage<R: Rng + ?Sized>(
    attack_power: f32,
    crit_chance: f32,
    crit_multiplier: f32,
    rng: &mut R,
) -> DamageRoll {
    let critical = rng.gen::<f32>() < crit_chance;
    let damage = if critical {
        attack_power * crit_multiplier
    } else {
        attack_power
    };
    DamageRoll { damage, critical }
}

/// Writes the directions of an `count`-shot volley centred on `base`.
///
/// A single shot travels along `base`. Larger volleys spread
/// `angle_step_degrees × (count − 1)` degrees symmetrically around it, from
/// the most clockwise shot to the most counter-clockwise one.
pub fn fan_directions(base: Vec2, count: u32, angle_step_degrees: f32, out: &mut Vec<Vec2>) {
    out.clear();
    match count {
        0 => {}
        1 => out.push(base),
        _ => {
            let step = angle_step_degrees.to_radians();
            let first = -step * (count - 1) as f32 / 2.0;
            out.extend((0..count).map(|index| {
                let angle = first + step * index as f32;
                Vec2::from_angle(angle).rotate(base)
            }));
        }
    }
}
