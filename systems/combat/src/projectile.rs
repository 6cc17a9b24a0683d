use std::time::Duration;

use horde_core::{EntityRef, Event, Handle, Vec2};
use horde_system_lifecycle::{DamageOutcome, EntityLifecycle};
use horde_system_pool::{Placeable, Poolable};

use crate::weapon::ProjectileLaunch;

/// What the owner of a projectile must do after an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileDisposition {
    /// Keep the projectile flying.
    Continue,
    /// Return the projectile to its pool.
    Release,
}

impl ProjectileDisposition {
    /// Whether the projectile must go back to its pool.
    #[must_use]
    pub const fn is_release(self) -> bool {
        matches!(self, Self::Release)
    }
}

/// Outcome of a projectile striking a hostile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitReport {
    /// Damage applied to the hostile.
    pub outcome: DamageOutcome,
    /// Whether the projectile keeps flying.
    pub disposition: ProjectileDisposition,
    /// Whether the shot was critical.
    pub critical: bool,
    /// Push the hostile should receive; zero disables knockback.
    pub knockback_force: f32,
}

/// Pooled projectile in flight.
#[derive(Clone, Debug)]
pub struct Projectile {
    position: Vec2,
    direction: Vec2,
    speed: f32,
    damage: f32,
    critical: bool,
    owner: EntityRef,
    pierce_remaining: u32,
    time_to_live: Duration,
    radius: f32,
    knockback_force: f32,
    struck: Vec<Handle>,
    released: bool,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            direction: Vec2::X,
            speed: 0.0,
            damage: 0.0,
            critical: false,
            owner: EntityRef::Player,
            pierce_remaining: 0,
            time_to_live: Duration::ZERO,
            radius: 0.0,
            knockback_force: 0.0,
            struck: Vec::new(),
            released: true,
        }
    }
}

impl Poolable for Projectile {
    fn on_acquire(&mut self) {
        self.struck.clear();
        self.released = false;
    }

    fn on_release(&mut self) {
        self.released = true;
    }
}

impl Placeable for Projectile {
    fn place(&mut self, position: Vec2, rotation: f32) {
        self.position = position;
        self.direction = Vec2::from_angle(rotation);
    }
}

impl Projectile {
    /// Loads the flight parameters of a launch; the direction is normalised.
    pub fn launch(&mut self, launch: &ProjectileLaunch) {
        self.position = launch.origin;
        self.direction = launch.direction.normalize_or_zero();
        self.speed = launch.speed;
        self.damage = launch.damage;
        self.critical = launch.critical;
        self.owner = launch.owner;
        self.pierce_remaining = launch.pierce;
        self.time_to_live = launch.lifetime;
        self.radius = launch.radius;
        self.knockback_force = launch.knockback_force;
    }

    /// Moves the projectile and counts its lifetime down.
    pub fn advance(&mut self, dt: Duration) -> ProjectileDisposition {
        if self.released {
            return ProjectileDisposition::Continue;
        }
        self.position += self.direction * self.speed * dt.as_secs_f32();
        self.time_to_live = self.time_to_live.saturating_sub(dt);
        if self.time_to_live.is_zero() {
            ProjectileDisposition::Release
        } else {
            ProjectileDisposition::Continue
        }
    }

    /// Applies this projectile's damage to a hostile it overlaps.
    ///
    /// Returns `None` when the hit does not count: the projectile is already
    /// spent, the target is its owner, or it struck this target before.
    /// Every counted hit consumes one pierce charge; the projectile is spent
    /// once none remain.
    pub fn strike(
        &mut self,
        target: Handle,
        lifecycle: &mut EntityLifecycle,
        out: &mut Vec<Event>,
    ) -> Option<HitReport> {
        if self.released
            || self.owner == EntityRef::Hostile(target)
            || self.struck.contains(&target)
        {
            return None;
        }
        self.struck.push(target);

        let outcome = lifecycle.take_damage(self.damage, Some(self.owner), out);
        let disposition = if self.pierce_remaining > 0 {
            self.pierce_remaining -= 1;
            ProjectileDisposition::Continue
        } else {
            ProjectileDisposition::Release
        };
        Some(HitReport {
            outcome,
            disposition,
            critical: self.critical,
            knockback_force: self.knockback_force,
        })
    }

    /// Static geometry always stops a projectile.
    #[must_use]
    pub fn hit_obstacle(&self) -> ProjectileDisposition {
        ProjectileDisposition::Release
    }

    /// Marks the projectile as spent. Returns `false` if it already was, so
    /// callers queue at most one release per projectile.
    pub fn retire(&mut self) -> bool {
        !std::mem::replace(&mut self.released, true)
    }

    /// Whether the projectile was spent this frame or returned to its pool.
    #[must_use]
    pub const fn is_spent(&self) -> bool {
        self.released
    }

    /// Current position in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Unit direction of travel.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Collision radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Damage carried by the projectile.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Whether the shot was critical.
    #[must_use]
    pub const fn critical(&self) -> bool {
        self.critical
    }

    /// Hostiles the projectile may still pass through.
    #[must_use]
    pub const fn pierce_remaining(&self) -> u32 {
        self.pierce_remaining
    }

    /// Lifetime left before the projectile expires.
    #[must_use]
    pub const fn time_to_live(&self) -> Duration {
        self.time_to_live
    }
}
