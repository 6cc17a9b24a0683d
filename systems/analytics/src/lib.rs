#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Run statistics folded from the world's event stream.

use std::{collections::HashSet, time::Duration};

use horde_core::{EntityRef, Event, Handle};
use serde::Serialize;

/// Summary of one survival run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunStats {
    /// Hostiles that entered the arena.
    pub hostiles_spawned: u32,
    /// Hostiles killed by the player.
    pub hostiles_killed: u32,
    /// Bosses among the killed hostiles.
    pub bosses_killed: u32,
    /// Spawn actions skipped for any reason.
    pub spawns_rejected: u32,
    /// Damage applied to hostiles after defense.
    pub damage_dealt: f32,
    /// Damage applied to the player after defense.
    pub damage_taken: f32,
    /// Projectiles launched by the player.
    pub projectiles_fired: u32,
    /// Projectile hits that landed.
    pub projectile_hits: u32,
    /// Landed hits that were critical.
    pub critical_hits: u32,
    /// Experience granted to the player.
    pub experience: f32,
    /// Gold dropped by hostiles.
    pub gold_dropped: u32,
    /// Gold picked up by the player.
    pub gold_collected: u32,
    /// Highest level reached.
    pub level: u32,
    /// Largest number of hostiles alive at once.
    pub peak_live_hostiles: usize,
    /// Seconds survived.
    pub survival_seconds: f32,
    /// Whether the player died.
    pub game_over: bool,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            hostiles_spawned: 0,
            hostiles_killed: 0,
            bosses_killed: 0,
            spawns_rejected: 0,
            damage_dealt: 0.0,
            damage_taken: 0.0,
            projectiles_fired: 0,
            projectile_hits: 0,
            critical_hits: 0,
            experience: 0.0,
            gold_dropped: 0,
            gold_collected: 0,
            level: 1,
            peak_live_hostiles: 0,
            survival_seconds: 0.0,
            game_over: false,
        }
    }
}

/// Pure system that accumulates [`RunStats`] from world events.
#[derive(Debug, Default)]
pub struct Analytics {
    stats: RunStats,
    survived: Duration,
    live: HashSet<Handle>,
    bosses: HashSet<Handle>,
}

impl Analytics {
    /// Creates an analytics system with empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a batch of events into the running statistics.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            self.record(event);
        }
        self.stats.survival_seconds = self.survived.as_secs_f32();
    }

    /// Statistics accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    fn record(&mut self, event: &Event) {
        let stats = &mut self.stats;
        match event {
            Event::TimeAdvanced { dt } => {
                if !stats.game_over {
                    self.survived = self.survived.saturating_add(*dt);
                }
            }
            Event::HostileSpawned { hostile, boss, .. } => {
                stats.hostiles_spawned += 1;
                let _ = self.live.insert(*hostile);
                if *boss {
                    let _ = self.bosses.insert(*hostile);
                }
                stats.peak_live_hostiles = stats.peak_live_hostiles.max(self.live.len());
            }
            Event::HostileReleased { hostile } => {
                let _ = self.live.remove(hostile);
                let _ = self.bosses.remove(hostile);
            }
            Event::SpawnRejected { .. } => stats.spawns_rejected += 1,
            Event::Died {
                entity: EntityRef::Hostile(hostile),
            } => {
                stats.hostiles_killed += 1;
                if self.bosses.contains(hostile) {
                    stats.bosses_killed += 1;
                }
            }
            Event::Damaged { entity, amount, .. } => match entity {
                EntityRef::Player => stats.damage_taken += amount,
                EntityRef::Hostile(_) => stats.damage_dealt += amount,
            },
            Event::ProjectileFired { .. } => stats.projectiles_fired += 1,
            Event::ProjectileHit { critical, .. } => {
                stats.projectile_hits += 1;
                if *critical {
                    stats.critical_hits += 1;
                }
            }
            Event::ExperienceGained { amount } => stats.experience += amount,
            Event::GoldDropped { amount, .. } => stats.gold_dropped += amount,
            Event::GoldCollected { total, .. } => stats.gold_collected = *total,
            Event::LeveledUp { level } => stats.level = stats.level.max(*level),
            Event::GameOver => stats.game_over = true,
            _ => {}
        }
    }
}
