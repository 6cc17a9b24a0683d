#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Health, damage, invincibility, and death bookkeeping shared by every
//! combat participant.
//!
//! [`EntityLifecycle`] is a value composed into the player and into every
//! pooled hostile. It owns the runtime [`CombatStats`] and reports everything
//! observable through [`Event`] values. The lifecycle never decides what a
//! death means: `take_damage` and `die` report the kill and the composing
//! entity runs its own death hook.

use std::time::Duration;

use glam::Vec2;
use horde_core::{CharacterDescriptor, EntityRef, Event, HostileDescriptor};
use log::{debug, warn};

mod knockback;

pub use knockback::{Knockback, KNOCKBACK_DURATION};

/// Period of the cosmetic visibility toggle while invincible.
pub const FLICKER_PERIOD: Duration = Duration::from_millis(100);

/// Stat values copied out of a descriptor when an entity is (re)initialised.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatBlock {
    /// Health ceiling; the entity starts at full health.
    pub max_health: f32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Base outgoing damage.
    pub attack_power: f32,
    /// Flat damage subtracted from every incoming hit.
    pub defense: f32,
    /// Invincibility granted after every damaging hit; zero disables it.
    pub invincibility_on_hit: Duration,
}

impl StatBlock {
    /// Stats of the controlled entity.
    #[must_use]
    pub fn from_character(descriptor: &CharacterDescriptor) -> Self {
        Self {
            max_health: descriptor.max_health,
            move_speed: descriptor.move_speed,
            attack_power: descriptor.attack_power,
            defense: descriptor.defense,
            invincibility_on_hit: Duration::try_from_secs_f32(descriptor.invincibility_duration)
                .unwrap_or(Duration::ZERO),
        }
    }

    /// Stats of a hostile with difficulty multipliers applied.
    #[must_use]
    pub fn from_hostile(descriptor: &HostileDescriptor, health_mult: f32, speed_mult: f32) -> Self {
        Self {
            max_health: descriptor.max_health * health_mult,
            move_speed: descriptor.move_speed * speed_mult,
            attack_power: descriptor.contact_damage,
            defense: descriptor.defense,
            invincibility_on_hit: Duration::ZERO,
        }
    }
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            max_health: 1.0,
            move_speed: 0.0,
            attack_power: 0.0,
            defense: 0.0,
            invincibility_on_hit: Duration::ZERO,
        }
    }
}

/// Runtime combat stats of one participant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatStats {
    health: f32,
    max_health: f32,
    move_speed: f32,
    attack_power: f32,
    defense: f32,
    invincible: bool,
    dead: bool,
}

impl CombatStats {
    fn from_block(block: &StatBlock) -> Self {
        let max_health = block.max_health.max(0.0);
        Self {
            health: max_health,
            max_health,
            move_speed: block.move_speed,
            attack_power: block.attack_power,
            defense: block.defense,
            invincible: false,
            dead: false,
        }
    }

    /// Current health in `[0, max_health]`.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Health ceiling.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Movement speed in world units per second.
    #[must_use]
    pub const fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Base outgoing damage.
    #[must_use]
    pub const fn attack_power(&self) -> f32 {
        self.attack_power
    }

    /// Flat damage mitigation.
    #[must_use]
    pub const fn defense(&self) -> f32 {
        self.defense
    }

    /// Whether the invincibility window is open.
    #[must_use]
    pub const fn invincible(&self) -> bool {
        self.invincible
    }

    /// Whether the participant died since its last initialisation.
    #[must_use]
    pub const fn dead(&self) -> bool {
        self.dead
    }
}

/// Result of a damage application.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageOutcome {
    /// Damage applied after defense; zero when the hit was ignored.
    pub applied: f32,
    /// Whether this hit killed the participant.
    pub killed: bool,
}

/// Health and status state machine of a combat participant.
#[derive(Clone, Debug)]
pub struct EntityLifecycle {
    entity: Option<EntityRef>,
    stats: CombatStats,
    invincibility_on_hit: Duration,
    invincibility_remaining: Duration,
    invincibility_elapsed: Duration,
    velocity: Vec2,
}

impl EntityLifecycle {
    /// Creates a living participant initialised from `block`.
    #[must_use]
    pub fn new(entity: EntityRef, block: &StatBlock) -> Self {
        let mut lifecycle = Self::unbound(block);
        lifecycle.bind(entity);
        lifecycle
    }

    /// Creates a participant with no identity yet.
    ///
    /// Until [`bind`](Self::bind) is called it ignores damage, healing, and
    /// death, so no event is ever attributed to the wrong entity.
    #[must_use]
    pub fn unbound(block: &StatBlock) -> Self {
        Self {
            entity: None,
            stats: CombatStats::from_block(block),
            invincibility_on_hit: block.invincibility_on_hit,
            invincibility_remaining: Duration::ZERO,
            invincibility_elapsed: Duration::ZERO,
            velocity: Vec2::ZERO,
        }
    }

    /// Re-initialises stats and clears death, invincibility, and velocity.
    pub fn set_data(&mut self, block: &StatBlock) {
        self.stats = CombatStats::from_block(block);
        self.invincibility_on_hit = block.invincibility_on_hit;
        self.invincibility_remaining = Duration::ZERO;
        self.invincibility_elapsed = Duration::ZERO;
        self.velocity = Vec2::ZERO;
    }

    /// Rebinds the participant identity reported in events.
    pub fn bind(&mut self, entity: EntityRef) {
        self.entity = Some(entity);
    }

    /// Drops the participant identity.
    pub fn unbind(&mut self) {
        self.entity = None;
    }

    /// Participant identity reported in events, if bound.
    #[must_use]
    pub const fn entity(&self) -> Option<EntityRef> {
        self.entity
    }

    fn bound_or_warn(&self, action: &str) -> Option<EntityRef> {
        if self.entity.is_none() {
            warn!("{action} on an unbound participant ignored");
        }
        self.entity
    }

    /// Current runtime stats.
    #[must_use]
    pub const fn stats(&self) -> &CombatStats {
        &self.stats
    }

    /// Whether the participant is dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.stats.dead
    }

    /// Whether the invincibility window is open.
    #[must_use]
    pub const fn is_invincible(&self) -> bool {
        self.stats.invincible
    }

    /// Time left in the invincibility window.
    #[must_use]
    pub const fn invincibility_remaining(&self) -> Duration {
        self.invincibility_remaining
    }

    /// Current velocity in world units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Sets the velocity; dead participants stay still.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        if !self.stats.dead {
            self.velocity = velocity;
        }
    }

    /// Applies a hit after defense mitigation.
    ///
    /// Dead and invincible participants ignore the hit entirely. A damaging
    /// hit restarts the invincibility window when the participant has one
    /// configured, and a hit that empties health kills the participant.
    pub fn take_damage(
        &mut self,
        amount: f32,
        attacker: Option<EntityRef>,
        out: &mut Vec<Event>,
    ) -> DamageOutcome {
        if self.stats.dead || self.stats.invincible {
            return DamageOutcome::default();
        }
        let Some(entity) = self.bound_or_warn("damage") else {
            return DamageOutcome::default();
        };

        let applied = (amount - self.stats.defense).max(0.0);
        self.stats.health = (self.stats.health - applied).max(0.0);
        out.push(Event::HealthChanged {
            entity,
            health: self.stats.health,
            max_health: self.stats.max_health,
        });
        out.push(Event::Damaged {
            entity,
            amount: applied,
            attacker,
        });

        if !self.invincibility_on_hit.is_zero() {
            self.start_invincibility(self.invincibility_on_hit, out);
        }

        let killed = self.stats.health <= 0.0 && self.die(out);
        DamageOutcome { applied, killed }
    }

    /// Restores health up to the ceiling. Returns the amount restored.
    pub fn heal(&mut self, amount: f32, out: &mut Vec<Event>) -> f32 {
        if self.stats.dead || !(amount > 0.0) {
            return 0.0;
        }
        let Some(entity) = self.bound_or_warn("heal") else {
            return 0.0;
        };
        let before = self.stats.health;
        self.stats.health = (before + amount).min(self.stats.max_health);
        let applied = self.stats.health - before;
        if applied > 0.0 {
            out.push(Event::HealthChanged {
                entity,
                health: self.stats.health,
                max_health: self.stats.max_health,
            });
        }
        applied
    }

    /// Marks the participant dead. Returns `false` if it already was.
    pub fn die(&mut self, out: &mut Vec<Event>) -> bool {
        let Some(entity) = self.bound_or_warn("death") else {
            return false;
        };
        if self.stats.dead {
            warn!("{entity:?} died more than once; ignoring");
            return false;
        }
        self.stats.dead = true;
        self.velocity = Vec2::ZERO;
        debug!("{entity:?} died");
        out.push(Event::Died { entity });
        true
    }

    /// Opens or restarts the invincibility window for `duration`.
    pub fn start_invincibility(&mut self, duration: Duration, out: &mut Vec<Event>) {
        if duration.is_zero() {
            return;
        }
        let Some(entity) = self.bound_or_warn("invincibility") else {
            return;
        };
        self.invincibility_remaining = duration;
        self.invincibility_elapsed = Duration::ZERO;
        if !self.stats.invincible {
            self.stats.invincible = true;
            out.push(Event::InvincibilityChanged {
                entity,
                active: true,
            });
        }
    }

    /// Counts the invincibility window down and closes it at expiry.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if !self.stats.invincible {
            return;
        }
        self.invincibility_elapsed += dt;
        self.invincibility_remaining = self.invincibility_remaining.saturating_sub(dt);
        if self.invincibility_remaining.is_zero() {
            self.stats.invincible = false;
            self.invincibility_elapsed = Duration::ZERO;
            if let Some(entity) = self.entity {
                out.push(Event::InvincibilityChanged {
                    entity,
                    active: false,
                });
            }
        }
    }

    /// Cosmetic visibility while invincible; toggles every [`FLICKER_PERIOD`].
    #[must_use]
    pub fn flicker_visible(&self) -> bool {
        if !self.stats.invincible {
            return true;
        }
        let phase = self.invincibility_elapsed.as_nanos() / FLICKER_PERIOD.as_nanos();
        phase % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_heal_is_ignored() {
        let mut lifecycle = EntityLifecycle::new(EntityRef::Player, &StatBlock::default());
        let mut events = Vec::new();
        assert_eq!(lifecycle.heal(-3.0, &mut events), 0.0);
        assert_eq!(lifecycle.heal(f32::NAN, &mut events), 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn flicker_toggles_every_period() {
        let block = StatBlock {
            invincibility_on_hit: Duration::from_secs(1),
            ..StatBlock::default()
        };
        let mut lifecycle = EntityLifecycle::new(EntityRef::Player, &block);
        let mut events = Vec::new();
        lifecycle.start_invincibility(Duration::from_secs(1), &mut events);

        assert!(lifecycle.flicker_visible());
        lifecycle.tick(Duration::from_millis(150), &mut events);
        assert!(!lifecycle.flicker_visible());
        lifecycle.tick(Duration::from_millis(100), &mut events);
        assert!(lifecycle.flicker_visible());
    }
}
