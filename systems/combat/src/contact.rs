use std::time::Duration;

/// Per-hostile gate on contact damage.
///
/// A fresh cooldown is ready immediately; every hit closes it for the
/// hostile's attack cooldown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContactCooldown {
    remaining: Duration,
}

impl ContactCooldown {
    /// Counts the cooldown down.
    pub fn tick(&mut self, dt: Duration) {
        self.remaining = self.remaining.saturating_sub(dt);
    }

    /// Whether a contact hit may land now.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Time until the next hit may land.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Claims a hit if ready and restarts the cooldown. Returns whether the
    /// hit may land.
    pub fn try_hit(&mut self, cooldown: Duration) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.remaining = cooldown;
        true
    }

    /// Makes the next contact hit land immediately.
    pub fn reset(&mut self) {
        self.remaining = Duration::ZERO;
    }
}
