//! Immutable authored templates consumed by the runtime.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

/// Stat template for the controlled entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterDescriptor {
    /// Health the player starts with and regenerates up to.
    pub max_health: f32,
    /// Health restored per second while alive.
    pub health_regen: f32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Base damage of every projectile before critical hits.
    pub attack_power: f32,
    /// Multiplier applied to the weapon's fire rate.
    pub attack_speed: f32,
    /// Probability in `[0, 1]` that a shot is critical.
    pub crit_chance: f32,
    /// Damage multiplier applied to critical shots; at least one.
    pub crit_multiplier: f32,
    /// Flat damage subtracted from every incoming hit.
    pub defense: f32,
    /// Seconds of invincibility granted after taking damage.
    pub invincibility_duration: f32,
    /// Multiplier applied to every experience reward.
    pub exp_multiplier: f32,
    /// Radius within which dropped gold is collected.
    pub pickup_range: f32,
    /// Extra projectiles added to every volley.
    pub projectile_count_bonus: u32,
}

impl Default for CharacterDescriptor {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            health_regen: 0.0,
            move_speed: 200.0,
            attack_power: 10.0,
            attack_speed: 1.0,
            crit_chance: 0.05,
            crit_multiplier: 2.0,
            defense: 0.0,
            invincibility_duration: 0.5,
            exp_multiplier: 1.0,
            pickup_range: 60.0,
            projectile_count_bonus: 0,
        }
    }
}

/// Stat template shared by every hostile of one kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileDescriptor {
    /// Unique identifier; doubles as the pool key for the kind.
    pub id: String,
    /// Health before difficulty multipliers.
    pub max_health: f32,
    /// Chase speed in world units per second before multipliers.
    pub move_speed: f32,
    /// Damage dealt to the player on contact.
    pub contact_damage: f32,
    /// Seconds between two contact hits from the same hostile.
    pub attack_cooldown: f32,
    /// Experience granted to the player on death.
    pub exp_reward: f32,
    /// Probability in `[0, 1]` that the hostile drops gold.
    pub gold_drop_chance: f32,
    /// Smallest gold amount dropped.
    pub min_gold: u32,
    /// Largest gold amount dropped.
    pub max_gold: u32,
    /// Knockback scale in `[0, 1]` applied to incoming pushes.
    pub knockback_resistance: f32,
    /// Marks tougher variants.
    pub is_elite: bool,
    /// Marks boss kinds.
    pub is_boss: bool,
    /// Collision radius in world units.
    pub radius: f32,
    /// Flat damage subtracted from every incoming hit.
    pub defense: f32,
}

impl Default for HostileDescriptor {
    fn default() -> Self {
        Self {
            id: String::new(),
            max_health: 10.0,
            move_speed: 80.0,
            contact_damage: 5.0,
            attack_cooldown: 1.0,
            exp_reward: 1.0,
            gold_drop_chance: 0.0,
            min_gold: 0,
            max_gold: 0,
            knockback_resistance: 1.0,
            is_elite: false,
            is_boss: false,
            radius: 16.0,
            defense: 0.0,
        }
    }
}

/// Template for the player's auto-fire weapon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDescriptor {
    /// Seconds between volleys at an attack speed of one.
    pub cooldown: f32,
    /// Projectiles per volley before the character bonus.
    pub projectile_count: u32,
    /// Angle in degrees between neighbouring projectiles of a volley.
    pub angle_step_degrees: f32,
    /// Projectile speed in world units per second.
    pub projectile_speed: f32,
    /// Additional hostiles a projectile may pass through.
    pub pierce: u32,
    /// Seconds a projectile stays alive.
    pub lifetime: f32,
    /// Radius searched for the nearest hostile.
    pub targeting_radius: f32,
    /// Collision radius of a projectile.
    pub projectile_radius: f32,
    /// Push applied to hostiles on hit; zero disables knockback.
    pub knockback_force: f32,
}

impl Default for WeaponDescriptor {
    fn default() -> Self {
        Self {
            cooldown: 1.0,
            projectile_count: 1,
            angle_step_degrees: 15.0,
            projectile_speed: 400.0,
            pierce: 0,
            lifetime: 2.0,
            targeting_radius: 500.0,
            projectile_radius: 6.0,
            knockback_force: 0.0,
        }
    }
}

/// Experience curve parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Experience required to leave level one.
    pub base_requirement: f32,
    /// Geometric growth of the requirement per level.
    pub scaling_factor: f32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_requirement: 10.0,
            scaling_factor: 1.2,
        }
    }
}

/// Sizing of the pools backing hostiles and projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Instances created up front for every hostile kind.
    pub hostile_initial_size: usize,
    /// Instances created up front for projectiles.
    pub projectile_initial_size: usize,
    /// Whether pools grow when exhausted.
    pub auto_grow: bool,
    /// Instances added per growth step.
    pub grow_increment: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            hostile_initial_size: 32,
            projectile_initial_size: 64,
            auto_grow: true,
            grow_increment: 16,
        }
    }
}

/// Recurring spawn rule active from `start_time` onward.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnWaveEntry {
    /// Elapsed game time at which the wave becomes active.
    pub start_time: Duration,
    /// Hostile kind spawned by the wave.
    pub hostile: Arc<HostileDescriptor>,
    /// Time between two firings of the wave; never zero.
    pub interval: Duration,
    /// Hostiles spawned per firing.
    pub count: u32,
    /// Health multiplier applied to spawned hostiles.
    pub health_mult: f32,
    /// Speed multiplier applied to spawned hostiles.
    pub speed_mult: f32,
}

/// One-shot boss trigger.
#[derive(Clone, Debug, PartialEq)]
pub struct BossSpawnEntry {
    /// Elapsed game time at which the boss appears.
    pub time: Duration,
    /// Hostile kind spawned as the boss.
    pub hostile: Arc<HostileDescriptor>,
    /// Whether normal spawning pauses until the boss dies.
    pub pause_normal: bool,
    /// Health multiplier applied to the boss.
    pub health_mult: f32,
}

/// Aggregate spawn configuration consumed read-only by the scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnTimeline {
    /// Base cadence interval at the start of a run.
    pub base_interval: Duration,
    /// Floor of the base cadence interval.
    pub min_interval: Duration,
    /// Seconds removed from the base interval per elapsed second.
    pub interval_decay_per_second: f32,
    /// Inner radius of the spawn annulus around the player.
    pub min_spawn_distance: f32,
    /// Outer radius of the spawn annulus around the player.
    pub max_spawn_distance: f32,
    /// Live hostile cap; spawns beyond it are rejected.
    pub max_population: usize,
    /// Hostiles per base cadence firing at minute zero.
    pub base_spawn_count: u32,
    /// Extra hostiles per base cadence firing per elapsed whole minute.
    pub spawn_count_growth_per_minute: u32,
    /// Fractional health growth per elapsed minute for normal spawns.
    pub health_growth_per_minute: f32,
    /// Fractional speed growth per elapsed minute for normal spawns.
    pub speed_growth_per_minute: f32,
    /// Roster used by the base cadence when no wave is active.
    pub base_hostiles: Vec<Arc<HostileDescriptor>>,
    /// Recurring waves in timeline order.
    pub waves: Vec<SpawnWaveEntry>,
    /// Boss triggers; the scheduler fires them in time order regardless of
    /// their order here.
    pub bosses: Vec<BossSpawnEntry>,
}

impl Default for SpawnTimeline {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(2),
            min_interval: Duration::from_millis(300),
            interval_decay_per_second: 0.005,
            min_spawn_distance: 600.0,
            max_spawn_distance: 900.0,
            max_population: 200,
            base_spawn_count: 1,
            spawn_count_growth_per_minute: 1,
            health_growth_per_minute: 0.1,
            speed_growth_per_minute: 0.02,
            base_hostiles: Vec::new(),
            waves: Vec::new(),
            bosses: Vec::new(),
        }
    }
}
