//! Entity types composed from the lifecycle and combat building blocks.

use std::{sync::Arc, time::Duration};

use horde_core::{CharacterDescriptor, EntityRef, Event, Handle, HostileDescriptor, Vec2};
use horde_system_combat::ContactCooldown;
use horde_system_lifecycle::{EntityLifecycle, Knockback, StatBlock};
use horde_system_pool::{Placeable, Poolable};
use horde_system_spawning::SpawnModifiers;
use log::info;

/// Collision radius of the player in world units.
pub const PLAYER_RADIUS: f32 = 16.0;

#[derive(Debug)]
pub(crate) struct Player {
    pub(crate) descriptor: Arc<CharacterDescriptor>,
    pub(crate) lifecycle: EntityLifecycle,
    pub(crate) position: Vec2,
    pub(crate) move_input: Vec2,
    pub(crate) input_frozen: bool,
}

impl Player {
    pub(crate) fn new(descriptor: Arc<CharacterDescriptor>) -> Self {
        let lifecycle =
            EntityLifecycle::new(EntityRef::Player, &StatBlock::from_character(&descriptor));
        Self {
            descriptor,
            lifecycle,
            position: Vec2::ZERO,
            move_input: Vec2::ZERO,
            input_frozen: false,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.lifecycle.is_dead()
    }

    /// Death hook: freezes input and announces the end of the run.
    pub(crate) fn on_death(&mut self, out: &mut Vec<Event>) {
        self.input_frozen = true;
        self.move_input = Vec2::ZERO;
        info!("player died; input frozen");
        out.push(Event::GameOver);
    }

    pub(crate) fn integrate(&mut self, step: Duration) {
        if self.input_frozen || !self.is_alive() {
            return;
        }
        let velocity = self.move_input.normalize_or_zero() * self.lifecycle.stats().move_speed();
        self.lifecycle.set_velocity(velocity);
        self.position += velocity * step.as_secs_f32();
    }
}

/// Pooled hostile instance; the prototype of each kind carries its descriptor.
#[derive(Clone, Debug)]
pub(crate) struct Hostile {
    pub(crate) descriptor: Arc<HostileDescriptor>,
    pub(crate) lifecycle: EntityLifecycle,
    pub(crate) position: Vec2,
    pub(crate) knockback: Knockback,
    pub(crate) contact: ContactCooldown,
    pub(crate) collision_enabled: bool,
    pub(crate) boss: bool,
    attack_cooldown: Duration,
}

impl Hostile {
    pub(crate) fn prototype(descriptor: Arc<HostileDescriptor>) -> Self {
        let block = StatBlock::from_hostile(&descriptor, 1.0, 1.0);
        let attack_cooldown =
            Duration::try_from_secs_f32(descriptor.attack_cooldown).unwrap_or(Duration::ZERO);
        Self {
            lifecycle: EntityLifecycle::unbound(&block),
            descriptor,
            position: Vec2::ZERO,
            knockback: Knockback::default(),
            contact: ContactCooldown::default(),
            collision_enabled: false,
            boss: false,
            attack_cooldown,
        }
    }

    /// Re-initialises a freshly acquired instance for a new life.
    pub(crate) fn revive(&mut self, handle: Handle, modifiers: SpawnModifiers) {
        self.lifecycle.bind(EntityRef::Hostile(handle));
        self.lifecycle.set_data(&StatBlock::from_hostile(
            &self.descriptor,
            modifiers.health_mult,
            modifiers.speed_mult,
        ));
        self.boss = modifiers.boss;
    }

    /// Whether the hostile can be targeted and can touch things.
    pub(crate) fn is_engaged(&self) -> bool {
        self.collision_enabled && !self.lifecycle.is_dead()
    }

    pub(crate) const fn attack_cooldown(&self) -> Duration {
        self.attack_cooldown
    }

    /// Moves along the knockback push if one is active, otherwise chases the
    /// player.
    pub(crate) fn integrate(&mut self, step: Duration, player_position: Vec2) {
        if self.lifecycle.is_dead() {
            return;
        }
        let velocity = if self.knockback.is_active() {
            let push = self.knockback.velocity();
            self.knockback.tick(step);
            push
        } else {
            (player_position - self.position).normalize_or_zero()
                * self.lifecycle.stats().move_speed()
        };
        self.lifecycle.set_velocity(velocity);
        self.position += velocity * step.as_secs_f32();
    }
}

impl Poolable for Hostile {
    fn on_acquire(&mut self) {
        self.collision_enabled = true;
        self.knockback.clear();
        self.contact.reset();
    }

    fn on_release(&mut self) {
        self.collision_enabled = false;
        self.knockback.clear();
        self.lifecycle.unbind();
    }
}

impl Placeable for Hostile {
    fn place(&mut self, position: Vec2, _rotation: f32) {
        self.position = position;
    }
}

/// Gold lying on the ground until the player walks over it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoldPickup {
    /// Position of the pickup in world units.
    pub position: Vec2,
    /// Gold granted on collection.
    pub amount: u32,
}

/// Static circle that stops projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    /// Centre in world units.
    pub center: Vec2,
    /// Radius in world units.
    pub radius: f32,
}

impl Obstacle {
    pub(crate) fn overlaps(&self, position: Vec2, radius: f32) -> bool {
        self.center.distance(position) <= self.radius + radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_core::PoolId;

    #[test]
    fn hostile_identity_follows_the_pooled_handle() {
        let mut hostile = Hostile::prototype(Arc::new(HostileDescriptor::default()));
        assert_eq!(hostile.lifecycle.entity(), None);

        let handle = Handle::new(PoolId::new(0), 2);
        hostile.on_acquire();
        hostile.revive(handle, SpawnModifiers::default());
        assert_eq!(hostile.lifecycle.entity(), Some(EntityRef::Hostile(handle)));

        hostile.on_release();
        assert_eq!(hostile.lifecycle.entity(), None);
        assert!(!hostile.is_engaged());
    }
}
