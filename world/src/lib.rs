#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for a Horde survival run.
//!
//! The world owns the player, the pooled hostiles and projectiles, and every
//! system that acts on them. Adapters mutate it only through [`apply`] and read
//! it only through the [`query`] module. A `Tick` runs fixed-step movement and
//! collision first and then a single variable-step gameplay update.

use std::time::Duration;

use horde_core::{Command, EntityRef, Event, Handle, ResolvedConfig};
use horde_system_combat::{payout, Progression, Projectile, ProjectileLaunch, Weapon};
use horde_system_pool::PoolRegistry;
use horde_system_spawning::SpawnScheduler;
use horde_system_targeting::TargetAcquisition;
use log::{debug, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod arena;
mod entities;

use arena::{ArenaSpawner, HostileField};
use entities::{Hostile, Player};
pub use entities::{GoldPickup, Obstacle, PLAYER_RADIUS};

/// Length of one physics step.
pub const FIXED_STEP: Duration = Duration::from_nanos(16_666_667);

/// Time a dead hostile lingers before returning to its pool.
pub const DEATH_GRACE: Duration = Duration::from_millis(400);

/// Key of the pool holding every projectile.
pub const PROJECTILE_POOL: &str = "projectiles";

const TARGET_QUERY_CAPACITY: usize = 64;
const COMBAT_RNG_SALT: u64 = 0x5bd1_e995_9e37_79b9;

/// Represents the authoritative Horde world state.
#[derive(Debug)]
pub struct World {
    config: ResolvedConfig,
    player: Player,
    hostiles: PoolRegistry<Hostile>,
    projectiles: PoolRegistry<Projectile>,
    scheduler: SpawnScheduler,
    targeting: TargetAcquisition,
    weapon: Weapon,
    progression: Progression,
    rng: ChaCha8Rng,
    obstacles: Vec<Obstacle>,
    pickups: Vec<GoldPickup>,
    dying: Vec<(Handle, Duration)>,
    physics_accumulator: Duration,
    elapsed: Duration,
    launches: Vec<ProjectileLaunch>,
    spent: Vec<Handle>,
    hits: Vec<(Handle, Handle)>,
    contacts: Vec<(Handle, f32)>,
}

impl World {
    /// Creates a world with pools sized from the configuration.
    ///
    /// Spawning starts stopped; submit [`Command::StartSpawning`] to begin.
    #[must_use]
    pub fn new(config: ResolvedConfig) -> Self {
        let pools = config.pools;
        let mut hostiles = PoolRegistry::new();
        for descriptor in &config.hostiles {
            if let Err(err) = hostiles.create_pool(
                descriptor.id.clone(),
                Hostile::prototype(descriptor.clone()),
                pools.hostile_initial_size,
                pools.auto_grow,
                pools.grow_increment,
            ) {
                warn!("hostile pool for '{}' unavailable: {err}", descriptor.id);
            }
        }

        let mut projectiles = PoolRegistry::new();
        if let Err(err) = projectiles.create_pool(
            PROJECTILE_POOL,
            Projectile::default(),
            pools.projectile_initial_size,
            pools.auto_grow,
            pools.grow_increment,
        ) {
            warn!("projectile pool unavailable: {err}");
        }

        Self {
            player: Player::new(config.character.clone()),
            scheduler: SpawnScheduler::new(config.timeline.clone(), config.seed),
            targeting: TargetAcquisition::new(TARGET_QUERY_CAPACITY),
            weapon: Weapon::new(config.weapon.clone(), config.character.attack_speed),
            progression: Progression::new(config.progression),
            rng: ChaCha8Rng::seed_from_u64(config.seed ^ COMBAT_RNG_SALT),
            hostiles,
            projectiles,
            obstacles: Vec::new(),
            pickups: Vec::new(),
            dying: Vec::new(),
            physics_accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
            launches: Vec::new(),
            spent: Vec::new(),
            hits: Vec::new(),
            contacts: Vec::new(),
            config,
        }
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.elapsed = self.elapsed.saturating_add(dt);
        out.push(Event::TimeAdvanced { dt });

        self.physics_accumulator = self.physics_accumulator.saturating_add(dt);
        while self.physics_accumulator >= FIXED_STEP {
            self.physics_accumulator -= FIXED_STEP;
            self.physics_step(FIXED_STEP, out);
        }

        self.update_timers(dt, out);
        self.fire_weapon(out);
        self.collect_gold(out);
        self.release_dead(dt, out);

        let mut spawner = ArenaSpawner::new(&mut self.hostiles);
        self.scheduler
            .tick(dt, self.player.position, &mut spawner, out);
        announce_releases(&spawner.released, out);
    }

    fn physics_step(&mut self, step: Duration, out: &mut Vec<Event>) {
        self.player.integrate(step);

        let target = self.player.position;
        for (_, hostile) in self.hostiles.iter_active_mut() {
            hostile.integrate(step, target);
        }

        self.spent.clear();
        for (handle, projectile) in self.projectiles.iter_active_mut() {
            if projectile.is_spent() {
                continue;
            }
            let expired = projectile.advance(step).is_release();
            let blocked = self
                .obstacles
                .iter()
                .any(|obstacle| obstacle.overlaps(projectile.position(), projectile.radius()))
                && projectile.hit_obstacle().is_release();
            if (expired || blocked) && projectile.retire() {
                self.spent.push(handle);
            }
        }
        self.release_spent_projectiles(out);

        // Overlaps are resolved per step; nothing moves more than one step
        // between checks.
        self.resolve_projectile_hits(out);
        self.resolve_contacts(out);
    }

    fn update_timers(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.player.lifecycle.tick(dt, out);
        if self.player.is_alive() {
            let regen = self.player.descriptor.health_regen * dt.as_secs_f32();
            let _ = self.player.lifecycle.heal(regen, out);
        }

        for (_, hostile) in self.hostiles.iter_active_mut() {
            hostile.lifecycle.tick(dt, out);
            hostile.contact.tick(dt);
        }

        self.weapon.tick(dt);
    }

    fn fire_weapon(&mut self, out: &mut Vec<Event>) {
        if !self.player.is_alive() {
            return;
        }

        self.launches.clear();
        let field = HostileField {
            hostiles: &self.hostiles,
        };
        let _ = self.weapon.try_fire(
            self.player.position,
            &self.player.descriptor,
            &mut self.targeting,
            &field,
            &mut self.rng,
            &mut self.launches,
        );

        for launch in &self.launches {
            let rotation = launch.direction.y.atan2(launch.direction.x);
            let Some(handle) = self
                .projectiles
                .acquire_at(PROJECTILE_POOL, launch.origin, rotation)
            else {
                continue;
            };
            if let Some(projectile) = self.projectiles.get_mut(handle) {
                projectile.launch(launch);
                out.push(Event::ProjectileFired {
                    projectile: handle,
                    direction: projectile.direction(),
                    critical: launch.critical,
                });
            }
        }
    }

    fn resolve_projectile_hits(&mut self, out: &mut Vec<Event>) {
        self.hits.clear();
        for (projectile_handle, projectile) in self.projectiles.iter_active() {
            if projectile.is_spent() {
                continue;
            }
            for (hostile_handle, hostile) in self.hostiles.iter_active() {
                if !hostile.is_engaged() {
                    continue;
                }
                let reach = projectile.radius() + hostile.descriptor.radius;
                if projectile.position().distance(hostile.position) <= reach {
                    self.hits.push((projectile_handle, hostile_handle));
                }
            }
        }

        self.spent.clear();
        let hits = std::mem::take(&mut self.hits);
        for &(projectile_handle, hostile_handle) in &hits {
            let Some(projectile) = self.projectiles.get_mut(projectile_handle) else {
                continue;
            };
            let Some(hostile) = self.hostiles.get_mut(hostile_handle) else {
                continue;
            };
            if !hostile.is_engaged() {
                continue;
            }
            let Some(report) = projectile.strike(hostile_handle, &mut hostile.lifecycle, out)
            else {
                continue;
            };
            out.push(Event::ProjectileHit {
                projectile: projectile_handle,
                target: hostile_handle,
                damage: report.outcome.applied,
                critical: report.critical,
            });

            if report.outcome.killed {
                self.on_hostile_killed(hostile_handle, out);
            } else if report.knockback_force > 0.0
                && hostile.knockback.apply(
                    hostile.position,
                    projectile.position(),
                    report.knockback_force,
                    hostile.descriptor.knockback_resistance,
                )
            {
                out.push(Event::KnockedBack {
                    hostile: hostile_handle,
                });
            }

            if report.disposition.is_release() {
                if let Some(projectile) = self.projectiles.get_mut(projectile_handle) {
                    if projectile.retire() {
                        self.spent.push(projectile_handle);
                    }
                }
            }
        }
        self.hits = hits;
        self.release_spent_projectiles(out);
    }

    fn resolve_contacts(&mut self, out: &mut Vec<Event>) {
        if !self.player.is_alive() {
            return;
        }

        self.contacts.clear();
        let player_position = self.player.position;
        for (handle, hostile) in self.hostiles.iter_active_mut() {
            if !hostile.is_engaged() {
                continue;
            }
            let reach = hostile.descriptor.radius + PLAYER_RADIUS;
            if hostile.position.distance(player_position) > reach {
                continue;
            }
            let cooldown = hostile.attack_cooldown();
            if hostile.contact.try_hit(cooldown) {
                self.contacts
                    .push((handle, hostile.lifecycle.stats().attack_power()));
            }
        }

        for &(attacker, damage) in &self.contacts {
            let outcome =
                self.player
                    .lifecycle
                    .take_damage(damage, Some(EntityRef::Hostile(attacker)), out);
            if outcome.killed {
                self.player.on_death(out);
                break;
            }
        }
    }

    fn collect_gold(&mut self, out: &mut Vec<Event>) {
        if !self.player.is_alive() || self.pickups.is_empty() {
            return;
        }
        let position = self.player.position;
        let range = self.player.descriptor.pickup_range;
        let progression = &mut self.progression;
        self.pickups.retain(|pickup| {
            if pickup.position.distance(position) > range {
                return true;
            }
            progression.add_gold(pickup.amount, out);
            false
        });
    }

    fn release_dead(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.dying.is_empty() {
            return;
        }
        let hostiles = &mut self.hostiles;
        self.dying.retain_mut(|(handle, remaining)| {
            *remaining = remaining.saturating_sub(dt);
            if !remaining.is_zero() {
                return true;
            }
            if hostiles.release_handle(*handle) {
                out.push(Event::HostileReleased { hostile: *handle });
            }
            false
        });
    }

    /// Death hook of a hostile: stop collisions, pay rewards, and schedule the
    /// return to its pool.
    fn on_hostile_killed(&mut self, handle: Handle, out: &mut Vec<Event>) {
        let Some(hostile) = self.hostiles.get_mut(handle) else {
            return;
        };
        hostile.collision_enabled = false;
        hostile.knockback.clear();
        let descriptor = hostile.descriptor.clone();
        let position = hostile.position;

        let reward = payout(
            &descriptor,
            self.player.descriptor.exp_multiplier,
            position,
            &mut self.rng,
            out,
        );
        let _ = self.progression.gain(reward.experience, out);
        if let Some(amount) = reward.gold {
            self.pickups.push(GoldPickup { position, amount });
        }

        let _ = self.scheduler.on_hostile_died(handle, out);
        self.dying.push((handle, DEATH_GRACE));
        debug!("'{}' killed at {position}", descriptor.id);
    }

    fn release_spent_projectiles(&mut self, out: &mut Vec<Event>) {
        for handle in self.spent.drain(..) {
            if self.projectiles.release_handle(handle) {
                out.push(Event::ProjectileReleased { projectile: handle });
            }
        }
    }

    fn despawn_all(&mut self, out: &mut Vec<Event>) {
        let mut spawner = ArenaSpawner::new(&mut self.hostiles);
        let _ = self.scheduler.despawn_all(&mut spawner, out);
        announce_releases(&spawner.released, out);

        for (handle, _) in self.dying.drain(..) {
            if self.hostiles.release_handle(handle) {
                out.push(Event::HostileReleased { hostile: handle });
            }
        }
    }
}

fn announce_releases(released: &[Handle], out: &mut Vec<Event>) {
    out.extend(
        released
            .iter()
            .map(|hostile| Event::HostileReleased { hostile: *hostile }),
    );
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::StartSpawning => world.scheduler.start(out_events),
        Command::StopSpawning => world.scheduler.stop(out_events),
        Command::DespawnAll => world.despawn_all(out_events),
        Command::SetMoveInput { direction } => {
            if world.player.input_frozen {
                debug!("move input ignored while frozen");
                return;
            }
            world.player.move_input = direction;
        }
        Command::HealPlayer { amount } => {
            let _ = world.player.lifecycle.heal(amount, out_events);
        }
        Command::AddObstacle { center, radius } => {
            if !(radius.is_finite() && radius > 0.0) {
                warn!("obstacle at {center} with radius {radius} ignored");
                return;
            }
            world.obstacles.push(Obstacle { center, radius });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use horde_core::{Handle, PoolInfo, ResolvedConfig, Vec2};
    use horde_system_spawning::SchedulerState;

    use super::{GoldPickup, Obstacle, World, PROJECTILE_POOL};

    /// Read-only snapshot of the player.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Position in world units.
        pub position: Vec2,
        /// Current health.
        pub health: f32,
        /// Health ceiling.
        pub max_health: f32,
        /// Whether the invincibility window is open.
        pub invincible: bool,
        /// Cosmetic visibility while flickering.
        pub visible: bool,
        /// Whether the player died.
        pub dead: bool,
        /// Whether movement input is ignored.
        pub input_frozen: bool,
        /// Current level.
        pub level: u32,
        /// Experience banked towards the next level.
        pub experience: f32,
        /// Experience needed to leave the current level.
        pub next_requirement: f32,
        /// Gold collected.
        pub gold: u32,
    }

    /// Read-only snapshot of a pooled hostile.
    #[derive(Clone, Debug, PartialEq)]
    pub struct HostileSnapshot {
        /// Handle of the hostile.
        pub handle: Handle,
        /// Descriptor identifier.
        pub kind: String,
        /// Position in world units.
        pub position: Vec2,
        /// Current health.
        pub health: f32,
        /// Health ceiling after difficulty multipliers.
        pub max_health: f32,
        /// Whether it was spawned by a boss entry.
        pub boss: bool,
        /// Whether it died and awaits release.
        pub dead: bool,
        /// Whether a knockback push is in progress.
        pub knocked_back: bool,
    }

    /// Read-only snapshot of a projectile in flight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Handle of the projectile.
        pub handle: Handle,
        /// Position in world units.
        pub position: Vec2,
        /// Unit direction of travel.
        pub direction: Vec2,
        /// Whether the shot was critical.
        pub critical: bool,
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let lifecycle = &world.player.lifecycle;
        let stats = lifecycle.stats();
        PlayerSnapshot {
            position: world.player.position,
            health: stats.health(),
            max_health: stats.max_health(),
            invincible: stats.invincible(),
            visible: lifecycle.flicker_visible(),
            dead: stats.dead(),
            input_frozen: world.player.input_frozen,
            level: world.progression.level(),
            experience: world.progression.experience(),
            next_requirement: world.progression.next_requirement(),
            gold: world.progression.gold(),
        }
    }

    /// Captures every hostile acquired from its pool, including those awaiting
    /// release after death, ordered by handle.
    #[must_use]
    pub fn hostiles(world: &World) -> Vec<HostileSnapshot> {
        let mut snapshots: Vec<HostileSnapshot> = world
            .hostiles
            .iter_active()
            .map(|(handle, hostile)| HostileSnapshot {
                handle,
                kind: hostile.descriptor.id.clone(),
                position: hostile.position,
                health: hostile.lifecycle.stats().health(),
                max_health: hostile.lifecycle.stats().max_health(),
                boss: hostile.boss,
                dead: hostile.lifecycle.is_dead(),
                knocked_back: hostile.knockback.is_active(),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.handle);
        snapshots
    }

    /// Captures every projectile in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter_active()
            .filter(|(_, projectile)| !projectile.is_spent())
            .map(|(handle, projectile)| ProjectileSnapshot {
                handle,
                position: projectile.position(),
                direction: projectile.direction(),
                critical: projectile.critical(),
            })
            .collect()
    }

    /// Number of projectiles acquired from the projectile pool.
    #[must_use]
    pub fn projectile_count(world: &World) -> usize {
        world.projectiles.active_count()
    }

    /// Bookkeeping counters of the hostile pool registered under `kind`.
    #[must_use]
    pub fn hostile_pool_info(world: &World, kind: &str) -> Option<PoolInfo> {
        world.hostiles.info(kind)
    }

    /// Bookkeeping counters of the projectile pool.
    #[must_use]
    pub fn projectile_pool_info(world: &World) -> Option<PoolInfo> {
        world.projectiles.info(PROJECTILE_POOL)
    }

    /// Current state of the spawn scheduler.
    #[must_use]
    pub fn scheduler_state(world: &World) -> SchedulerState {
        world.scheduler.state()
    }

    /// Hostiles spawned by the scheduler that are still alive.
    #[must_use]
    pub fn live_hostile_count(world: &World) -> usize {
        world.scheduler.live_count()
    }

    /// Game time elapsed in the current spawn run.
    #[must_use]
    pub fn spawn_elapsed(world: &World) -> Duration {
        world.scheduler.elapsed()
    }

    /// Total simulated time since the world was created.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Static obstacles placed in the arena.
    #[must_use]
    pub fn obstacles(world: &World) -> &[Obstacle] {
        &world.obstacles
    }

    /// Gold waiting to be collected.
    #[must_use]
    pub fn gold_pickups(world: &World) -> &[GoldPickup] {
        &world.pickups
    }

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &ResolvedConfig {
        &world.config
    }

    /// Whether the player died.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.player.lifecycle.is_dead()
    }
}
