#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Horde survival engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! everything that happened during the frame. Descriptors and the spawn
//! timeline are immutable configuration shared between many entity instances.

use std::time::Duration;

pub use glam::Vec2;

pub mod config;
mod descriptors;

pub use config::{ConfigError, GameConfig, ResolvedConfig, DEFAULT_CONFIG_TOML};
pub use descriptors::{
    BossSpawnEntry, CharacterDescriptor, HostileDescriptor, PoolConfig, ProgressionConfig,
    SpawnTimeline, SpawnWaveEntry, WeaponDescriptor,
};

/// Identifier allocated to a resource pool when it is created.
///
/// Recreating a pool under the same key yields a fresh identifier, so handles
/// issued by a removed pool never resolve against its replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u32);

impl PoolId {
    /// Creates a new pool identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque reference to a pooled entity instance.
///
/// A handle is owned by exactly one pool: the pool identity is part of the
/// handle, so a pool rejects handles minted by any other pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    pool: PoolId,
    slot: u32,
}

impl Handle {
    /// Creates a handle addressing `slot` inside the pool identified by `pool`.
    #[must_use]
    pub const fn new(pool: PoolId, slot: u32) -> Self {
        Self { pool, slot }
    }

    /// Pool that owns the referenced instance.
    #[must_use]
    pub const fn pool(&self) -> PoolId {
        self.pool
    }

    /// Zero-based slot index of the instance inside its pool.
    #[must_use]
    pub const fn slot(&self) -> u32 {
        self.slot
    }
}

/// Identifies a combat participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// The single controlled entity.
    Player,
    /// A pooled hostile entity.
    Hostile(Handle),
}

/// Snapshot of a pool's bookkeeping counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolInfo {
    /// Instances waiting on the idle stack.
    pub idle: usize,
    /// Instances ever created by the pool and still owned by it.
    pub total: usize,
    /// Instances currently handed out to callers.
    pub active: usize,
}

/// Reasons a spawn action may be skipped for the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnRejection {
    /// The live hostile population already reached the configured cap.
    PopulationCap,
    /// The pool backing the hostile kind had no idle instance and could not grow.
    PoolExhausted,
    /// No pool is registered for the requested hostile kind.
    UnknownPool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Starts the spawn scheduler from the beginning of its timeline.
    StartSpawning,
    /// Stops polling the spawn scheduler.
    StopSpawning,
    /// Returns every live hostile to its pool.
    DespawnAll,
    /// Updates the player's desired movement direction.
    SetMoveInput {
        /// Direction of travel; normalised by the world, zero to stand still.
        direction: Vec2,
    },
    /// Restores health to the player.
    HealPlayer {
        /// Amount of health to restore.
        amount: f32,
    },
    /// Places a static circular obstacle that blocks projectiles.
    AddObstacle {
        /// Centre of the obstacle in world units.
        center: Vec2,
        /// Radius of the obstacle in world units.
        radius: f32,
    },
}

/// Events broadcast by the world and systems while processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports a health change on a combat participant.
    HealthChanged {
        /// Participant whose health changed.
        entity: EntityRef,
        /// Health after the change.
        health: f32,
        /// Maximum health of the participant.
        max_health: f32,
    },
    /// Reports that damage was applied after defense.
    Damaged {
        /// Participant that received damage.
        entity: EntityRef,
        /// Damage applied after defense mitigation.
        amount: f32,
        /// Participant responsible for the damage, if known.
        attacker: Option<EntityRef>,
    },
    /// Reports that the invincibility window opened or closed.
    InvincibilityChanged {
        /// Participant whose invincibility changed.
        entity: EntityRef,
        /// Whether the window is now open.
        active: bool,
    },
    /// Reports that a participant died.
    Died {
        /// Participant that died.
        entity: EntityRef,
    },
    /// Announces that the player died and input is frozen.
    GameOver,
    /// Reports that a hostile was pushed away from a hit.
    KnockedBack {
        /// Hostile that was pushed.
        hostile: Handle,
    },
    /// Reports experience granted to the player.
    ExperienceGained {
        /// Experience granted after the player's multiplier.
        amount: f32,
    },
    /// Reports that the player reached a new level.
    LeveledUp {
        /// Level reached.
        level: u32,
    },
    /// Reports that a hostile dropped gold.
    GoldDropped {
        /// Position of the dropped gold.
        position: Vec2,
        /// Amount of gold dropped.
        amount: u32,
    },
    /// Reports that the player picked up gold.
    GoldCollected {
        /// Amount of gold collected.
        amount: u32,
        /// Player gold total after collection.
        total: u32,
    },
    /// Confirms that a hostile entered the arena.
    HostileSpawned {
        /// Handle of the spawned hostile.
        hostile: Handle,
        /// Descriptor identifier of the hostile kind.
        kind: String,
        /// Spawn position in world units.
        position: Vec2,
        /// Whether the hostile was spawned by a boss entry.
        boss: bool,
    },
    /// Confirms that a hostile returned to its pool.
    HostileReleased {
        /// Handle of the released hostile.
        hostile: Handle,
    },
    /// Reports that a spawn action was skipped.
    SpawnRejected {
        /// Descriptor identifier of the hostile kind.
        kind: String,
        /// Reason the spawn was skipped.
        reason: SpawnRejection,
    },
    /// Announces that the spawn scheduler started.
    SpawningStarted,
    /// Announces that the spawn scheduler stopped.
    SpawningStopped,
    /// Announces that a boss paused normal spawning.
    NormalSpawningPaused {
        /// Boss whose death resumes normal spawning.
        boss: Handle,
    },
    /// Announces that normal spawning resumed.
    NormalSpawningResumed,
    /// Reports that the player launched a projectile.
    ProjectileFired {
        /// Handle of the launched projectile.
        projectile: Handle,
        /// Unit direction of travel.
        direction: Vec2,
        /// Whether the shot rolled a critical hit.
        critical: bool,
    },
    /// Reports that a projectile struck a hostile.
    ProjectileHit {
        /// Projectile that struck.
        projectile: Handle,
        /// Hostile that was struck.
        target: Handle,
        /// Damage applied after defense.
        damage: f32,
        /// Whether the shot was a critical hit.
        critical: bool,
    },
    /// Confirms that a projectile returned to its pool.
    ProjectileReleased {
        /// Handle of the released projectile.
        projectile: Handle,
    },
}
