use std::{sync::Arc, time::Duration};

use horde_core::{CharacterDescriptor, EntityRef, Handle, Vec2, WeaponDescriptor};
use horde_system_targeting::{CandidateSource, TargetAcquisition};
use log::trace;
use rand::Rng;

use crate::{fan_directions, roll_damage};

/// Everything needed to put one projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileLaunch {
    /// Spawn position.
    pub origin: Vec2,
    /// Unit direction of travel.
    pub direction: Vec2,
    /// Speed in world units per second.
    pub speed: f32,
    /// Damage after the critical roll.
    pub damage: f32,
    /// Whether the critical multiplier applied.
    pub critical: bool,
    /// Hostiles the projectile may pass through.
    pub pierce: u32,
    /// Lifetime before expiry.
    pub lifetime: Duration,
    /// Collision radius.
    pub radius: f32,
    /// Push applied to struck hostiles.
    pub knockback_force: f32,
    /// Participant that fired the projectile.
    pub owner: EntityRef,
}

/// Auto-fire weapon aimed at the nearest hostile.
#[derive(Debug)]
pub struct Weapon {
    descriptor: Arc<WeaponDescriptor>,
    cooldown: Duration,
    lifetime: Duration,
    remaining: Duration,
    directions: Vec<Vec2>,
}

impl Weapon {
    /// Creates a ready weapon whose cadence scales with `attack_speed`.
    #[must_use]
    pub fn new(descriptor: Arc<WeaponDescriptor>, attack_speed: f32) -> Self {
        let cooldown = Duration::try_from_secs_f32(descriptor.cooldown / attack_speed)
            .unwrap_or(Duration::from_secs(1));
        let lifetime =
            Duration::try_from_secs_f32(descriptor.lifetime).unwrap_or(Duration::from_secs(1));
        Self {
            descriptor,
            cooldown,
            lifetime,
            remaining: Duration::ZERO,
            directions: Vec::new(),
        }
    }

    /// Counts the cooldown down.
    pub fn tick(&mut self, dt: Duration) {
        self.remaining = self.remaining.saturating_sub(dt);
    }

    /// Whether the next volley may fire.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Time between volleys.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Weapon template.
    #[must_use]
    pub fn descriptor(&self) -> &WeaponDescriptor {
        &self.descriptor
    }

    /// Fires a volley at the nearest hostile when ready.
    ///
    /// Pushes one launch per projectile into `out` and restarts the cooldown.
    /// Without a target in range the weapon stays ready and nothing is pushed.
    /// Returns the targeted hostile.
    pub fn try_fire<S, R>(
        &mut self,
        origin: Vec2,
        character: &CharacterDescriptor,
        targeting: &mut TargetAcquisition,
        source: &S,
        rng: &mut R,
        out: &mut Vec<ProjectileLaunch>,
    ) -> Option<Handle>
    where
        S: CandidateSource,
        R: Rng + ?Sized,
    {
        if !self.is_ready() {
            return None;
        }
        let target =
            targeting.find_nearest_candidate(origin, self.descriptor.targeting_radius, source)?;

        let base = (target.position - origin).normalize_or_zero();
        let base = if base == Vec2::ZERO { Vec2::X } else { base };
        let count = self
            .descriptor
            .projectile_count
            .saturating_add(character.projectile_count_bonus);
        fan_directions(
            base,
            count,
            self.descriptor.angle_step_degrees,
            &mut self.directions,
        );

        out.reserve(self.directions.len());
        for direction in &self.directions {
            let roll = roll_damage(
                character.attack_power,
                character.crit_chance,
                character.crit_multiplier,
                rng,
            );
            out.push(ProjectileLaunch {
                origin,
                direction: *direction,
                speed: self.descriptor.projectile_speed,
                damage: roll.damage,
                critical: roll.critical,
                pierce: self.descriptor.pierce,
                lifetime: self.lifetime,
                radius: self.descriptor.projectile_radius,
                knockback_force: self.descriptor.knockback_force,
                owner: EntityRef::Player,
            });
        }
        trace!(
            "volley of {} aimed at {:?}",
            self.directions.len(),
            target.handle
        );

        self.remaining = self.cooldown;
        Some(target.handle)
    }
}
