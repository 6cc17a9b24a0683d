use std::time::Duration;

use glam::Vec2;

/// Time a pushed hostile drifts before chasing again.
pub const KNOCKBACK_DURATION: Duration = Duration::from_millis(200);

/// Short-lived push that overrides a hostile's chase velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Knockback {
    velocity: Vec2,
    remaining: Duration,
}

impl Knockback {
    /// Pushes away from `source_position` with `force × resistance`.
    ///
    /// Coincident positions have no direction and leave the state untouched,
    /// as does a zero effective force. Returns whether a push started.
    pub fn apply(
        &mut self,
        own_position: Vec2,
        source_position: Vec2,
        force: f32,
        resistance: f32,
    ) -> bool {
        let direction = (own_position - source_position).normalize_or_zero();
        let strength = force * resistance;
        if direction == Vec2::ZERO || !(strength > 0.0) {
            return false;
        }
        self.velocity = direction * strength;
        self.remaining = KNOCKBACK_DURATION;
        true
    }

    /// Counts the push down; the velocity drops to zero at expiry.
    pub fn tick(&mut self, dt: Duration) {
        if self.remaining.is_zero() {
            return;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.velocity = Vec2::ZERO;
        }
    }

    /// Cancels any push in progress.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether the push still suspends chasing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.remaining.is_zero()
    }

    /// Push velocity in world units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }
}
