use horde_core::{Event, ProgressionConfig};
use log::info;

/// Level, experience, and gold carried by the player.
#[derive(Clone, Debug, PartialEq)]
pub struct Progression {
    level: u32,
    experience: f32,
    gold: u32,
    config: ProgressionConfig,
}

impl Progression {
    /// Starts at level one with nothing banked.
    #[must_use]
    pub fn new(config: ProgressionConfig) -> Self {
        Self {
            level: 1,
            experience: 0.0,
            gold: 0,
            config,
        }
    }

    /// Experience needed to leave `level`: `base × scaling^(level − 1)`.
    #[must_use]
    pub fn requirement(&self, level: u32) -> f32 {
        let exponent = level.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.config.base_requirement * self.config.scaling_factor.powi(exponent)
    }

    /// Banks experience and levels up as many times as it allows.
    ///
    /// Each level gained emits one [`Event::LeveledUp`]. Returns the number of
    /// levels gained.
    pub fn gain(&mut self, amount: f32, out: &mut Vec<Event>) -> u32 {
        if !(amount > 0.0) {
            return 0;
        }
        self.experience += amount;

        let mut gained = 0;
        loop {
            let requirement = self.requirement(self.level);
            if !(requirement > 0.0) || self.experience < requirement {
                break;
            }
            self.experience -= requirement;
            self.level += 1;
            gained += 1;
            info!("player reached level {}", self.level);
            out.push(Event::LeveledUp { level: self.level });
        }
        gained
    }

    /// Banks collected gold.
    pub fn add_gold(&mut self, amount: u32, out: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }
        self.gold = self.gold.saturating_add(amount);
        out.push(Event::GoldCollected {
            amount,
            total: self.gold,
        });
    }

    /// Current level, starting at one.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience banked towards the next level.
    #[must_use]
    pub const fn experience(&self) -> f32 {
        self.experience
    }

    /// Experience needed to leave the current level.
    #[must_use]
    pub fn next_requirement(&self) -> f32 {
        self.requirement(self.level)
    }

    /// Gold collected so far.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }
}
