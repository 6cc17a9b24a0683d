#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-driven hostile spawning.
//!
//! The [`SpawnScheduler`] walks a shared [`SpawnTimeline`]: a base cadence
//! that speeds up over time, overlapping waves that take over while active,
//! and one-shot bosses that may pause everything else until they die. The
//! scheduler only decides what to spawn and where; instances come from an
//! injected [`HostileSpawner`].

use std::{f32::consts::TAU, sync::Arc, time::Duration};

use horde_core::{Event, Handle, HostileDescriptor, SpawnRejection, SpawnTimeline, Vec2};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Multipliers applied to a hostile as it spawns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnModifiers {
    /// Multiplier applied to the descriptor's maximum health.
    pub health_mult: f32,
    /// Multiplier applied to the descriptor's movement speed.
    pub speed_mult: f32,
    /// Whether the spawn comes from a boss entry.
    pub boss: bool,
}

impl Default for SpawnModifiers {
    fn default() -> Self {
        Self {
            health_mult: 1.0,
            speed_mult: 1.0,
            boss: false,
        }
    }
}

/// Collaborator that turns spawn decisions into live hostiles.
pub trait HostileSpawner {
    /// Brings a hostile of the given kind to life at `position`.
    fn spawn(
        &mut self,
        descriptor: &Arc<HostileDescriptor>,
        position: Vec2,
        modifiers: SpawnModifiers,
    ) -> Result<Handle, SpawnRejection>;

    /// Returns a live hostile to its pool. Returns whether it was live.
    fn despawn(&mut self, hostile: Handle) -> bool;
}

/// Observable state of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// The scheduler ignores ticks.
    Stopped,
    /// The scheduler advances its timeline every tick.
    Spawning {
        /// Whether a boss currently suppresses waves and the base cadence.
        normal_paused: bool,
    },
}

/// State machine that spawns hostiles according to a [`SpawnTimeline`].
#[derive(Debug)]
pub struct SpawnScheduler {
    timeline: Arc<SpawnTimeline>,
    rng: ChaCha8Rng,
    state: SchedulerState,
    elapsed: Duration,
    base_countdown: Duration,
    wave_countdowns: Vec<Option<Duration>>,
    boss_order: Vec<usize>,
    next_boss: usize,
    pausing_boss: Option<Handle>,
    live: Vec<Handle>,
}

impl SpawnScheduler {
    /// Creates a stopped scheduler. `seed` drives positions and roster picks.
    #[must_use]
    pub fn new(timeline: Arc<SpawnTimeline>, seed: u64) -> Self {
        let waves = timeline.waves.len();
        let mut boss_order: Vec<usize> = (0..timeline.bosses.len()).collect();
        boss_order.sort_by_key(|&index| timeline.bosses[index].time);
        Self {
            base_countdown: timeline.base_interval,
            timeline,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state: SchedulerState::Stopped,
            elapsed: Duration::ZERO,
            wave_countdowns: vec![None; waves],
            boss_order,
            next_boss: 0,
            pausing_boss: None,
            live: Vec::new(),
        }
    }

    /// Starts a fresh run from the beginning of the timeline.
    ///
    /// Hostiles spawned by a previous run stay tracked.
    pub fn start(&mut self, out: &mut Vec<Event>) {
        self.elapsed = Duration::ZERO;
        self.base_countdown = self.timeline.base_interval;
        self.wave_countdowns.iter_mut().for_each(|slot| *slot = None);
        self.next_boss = 0;
        self.pausing_boss = None;
        self.state = SchedulerState::Spawning {
            normal_paused: false,
        };
        if self.timeline.base_hostiles.is_empty() {
            warn!("spawn timeline has no base hostiles; base cadence disabled");
        }
        info!("spawning started");
        out.push(Event::SpawningStarted);
    }

    /// Stops polling the timeline. Live hostiles are left alone.
    pub fn stop(&mut self, out: &mut Vec<Event>) {
        if self.state == SchedulerState::Stopped {
            return;
        }
        self.state = SchedulerState::Stopped;
        info!("spawning stopped at {:.1}s", self.elapsed.as_secs_f32());
        out.push(Event::SpawningStopped);
    }

    /// Advances the timeline by `dt` and spawns whatever came due.
    pub fn tick<S: HostileSpawner>(
        &mut self,
        dt: Duration,
        player_position: Vec2,
        spawner: &mut S,
        out: &mut Vec<Event>,
    ) {
        if self.state == SchedulerState::Stopped {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);

        self.poll_bosses(player_position, spawner, out);

        if self.is_normal_paused() {
            return;
        }
        if !self.poll_waves(dt, player_position, spawner, out) {
            self.poll_base_cadence(dt, player_position, spawner, out);
        }
    }

    /// Forgets a dead hostile. Resumes normal spawning if it was the pausing
    /// boss. Returns whether the hostile was tracked.
    pub fn on_hostile_died(&mut self, hostile: Handle, out: &mut Vec<Event>) -> bool {
        let Some(index) = self.live.iter().position(|live| *live == hostile) else {
            return false;
        };
        let _ = self.live.swap_remove(index);

        if self.pausing_boss == Some(hostile) {
            self.resume_normal(out);
        }
        true
    }

    /// Despawns every tracked hostile and clears the boss pause. Returns the
    /// number of hostiles despawned.
    pub fn despawn_all<S: HostileSpawner>(
        &mut self,
        spawner: &mut S,
        out: &mut Vec<Event>,
    ) -> usize {
        let despawned = self
            .live
            .drain(..)
            .filter(|hostile| spawner.despawn(*hostile))
            .count();
        if self.pausing_boss.is_some() {
            self.resume_normal(out);
        }
        info!("despawned {despawned} hostiles");
        despawned
    }

    /// Number of hostiles spawned and not yet dead.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Current state of the scheduler.
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Game time elapsed in the current run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Boss whose death resumes normal spawning, if any.
    #[must_use]
    pub const fn pausing_boss(&self) -> Option<Handle> {
        self.pausing_boss
    }

    /// Whether a boss currently suppresses normal spawning.
    #[must_use]
    pub const fn is_normal_paused(&self) -> bool {
        matches!(
            self.state,
            SchedulerState::Spawning {
                normal_paused: true
            }
        )
    }

    /// Base cadence interval at the current elapsed time.
    #[must_use]
    pub fn current_base_interval(&self) -> Duration {
        let decay = self.timeline.interval_decay_per_second * self.elapsed.as_secs_f32();
        let reduced = Duration::try_from_secs_f32(
            (self.timeline.base_interval.as_secs_f32() - decay).max(0.0),
        )
        .unwrap_or(Duration::ZERO);
        reduced.max(self.timeline.min_interval)
    }

    /// Hostiles per base cadence firing at the current elapsed time.
    #[must_use]
    pub fn current_base_count(&self) -> u32 {
        let whole_minutes = u32::try_from(self.elapsed.as_secs() / 60).unwrap_or(u32::MAX);
        self.timeline.base_spawn_count.saturating_add(
            self.timeline
                .spawn_count_growth_per_minute
                .saturating_mul(whole_minutes),
        )
    }

    fn minutes(&self) -> f32 {
        self.elapsed.as_secs_f32() / 60.0
    }

    fn difficulty(&self, health_mult: f32, speed_mult: f32) -> SpawnModifiers {
        let minutes = self.minutes();
        SpawnModifiers {
            health_mult: health_mult * (1.0 + self.timeline.health_growth_per_minute * minutes),
            speed_mult: speed_mult * (1.0 + self.timeline.speed_growth_per_minute * minutes),
            boss: false,
        }
    }

    fn poll_bosses<S: HostileSpawner>(
        &mut self,
        player_position: Vec2,
        spawner: &mut S,
        out: &mut Vec<Event>,
    ) {
        let timeline = Arc::clone(&self.timeline);
        let Some(entry) = self
            .boss_order
            .get(self.next_boss)
            .and_then(|&index| timeline.bosses.get(index))
        else {
            return;
        };
        if entry.time > self.elapsed {
            return;
        }
        self.next_boss += 1;

        let modifiers = SpawnModifiers {
            health_mult: entry.health_mult,
            speed_mult: 1.0,
            boss: true,
        };
        info!(
            "boss '{}' due at {:.1}s",
            entry.hostile.id,
            entry.time.as_secs_f32()
        );
        let Some(boss) = self.spawn_one(&entry.hostile, player_position, modifiers, spawner, out)
        else {
            return;
        };
        if entry.pause_normal {
            self.pausing_boss = Some(boss);
            self.state = SchedulerState::Spawning {
                normal_paused: true,
            };
            info!("normal spawning paused until boss {boss:?} dies");
            out.push(Event::NormalSpawningPaused { boss });
        }
    }

    fn poll_waves<S: HostileSpawner>(
        &mut self,
        dt: Duration,
        player_position: Vec2,
        spawner: &mut S,
        out: &mut Vec<Event>,
    ) -> bool {
        let timeline = Arc::clone(&self.timeline);
        let mut any_active = false;
        for (index, wave) in timeline.waves.iter().enumerate() {
            if self.elapsed < wave.start_time {
                continue;
            }
            any_active = true;

            let since_start = self.elapsed - wave.start_time;
            let (countdown, step) = match self.wave_countdowns[index] {
                Some(countdown) => (countdown, dt),
                None => {
                    debug!("wave '{}' activated", wave.hostile.id);
                    (wave.interval, since_start.min(dt))
                }
            };
            let countdown = countdown.saturating_sub(step);
            if !countdown.is_zero() {
                self.wave_countdowns[index] = Some(countdown);
                continue;
            }
            self.wave_countdowns[index] = Some(wave.interval);

            let modifiers = self.difficulty(wave.health_mult, wave.speed_mult);
            for _ in 0..wave.count {
                let _ = self.spawn_one(&wave.hostile, player_position, modifiers, spawner, out);
            }
        }
        any_active
    }

    fn poll_base_cadence<S: HostileSpawner>(
        &mut self,
        dt: Duration,
        player_position: Vec2,
        spawner: &mut S,
        out: &mut Vec<Event>,
    ) {
        self.base_countdown = self.base_countdown.saturating_sub(dt);
        if !self.base_countdown.is_zero() {
            return;
        }
        self.base_countdown = self.current_base_interval();

        let timeline = Arc::clone(&self.timeline);
        if timeline.base_hostiles.is_empty() {
            return;
        }
        let modifiers = self.difficulty(1.0, 1.0);
        for _ in 0..self.current_base_count() {
            let pick = self.rng.gen_range(0..timeline.base_hostiles.len());
            let _ = self.spawn_one(
                &timeline.base_hostiles[pick],
                player_position,
                modifiers,
                spawner,
                out,
            );
        }
    }

    fn spawn_one<S: HostileSpawner>(
        &mut self,
        descriptor: &Arc<HostileDescriptor>,
        player_position: Vec2,
        modifiers: SpawnModifiers,
        spawner: &mut S,
        out: &mut Vec<Event>,
    ) -> Option<Handle> {
        if self.live.len() >= self.timeline.max_population {
            debug!(
                "spawn of '{}' rejected at population cap {}",
                descriptor.id, self.timeline.max_population
            );
            out.push(Event::SpawnRejected {
                kind: descriptor.id.clone(),
                reason: SpawnRejection::PopulationCap,
            });
            return None;
        }

        let position = self.spawn_position(player_position);
        match spawner.spawn(descriptor, position, modifiers) {
            Ok(hostile) => {
                self.live.push(hostile);
                debug!("spawned '{}' at {position}", descriptor.id);
                out.push(Event::HostileSpawned {
                    hostile,
                    kind: descriptor.id.clone(),
                    position,
                    boss: modifiers.boss,
                });
                Some(hostile)
            }
            Err(reason) => {
                warn!("spawn of '{}' skipped: {reason:?}", descriptor.id);
                out.push(Event::SpawnRejected {
                    kind: descriptor.id.clone(),
                    reason,
                });
                None
            }
        }
    }

    fn spawn_position(&mut self, player_position: Vec2) -> Vec2 {
        let angle = self.rng.gen_range(0.0..TAU);
        let min = self.timeline.min_spawn_distance;
        let max = self.timeline.max_spawn_distance.max(min);
        let distance = self.rng.gen_range(min..=max);
        player_position + Vec2::from_angle(angle) * distance
    }

    fn resume_normal(&mut self, out: &mut Vec<Event>) {
        self.pausing_boss = None;
        if self.is_normal_paused() {
            self.state = SchedulerState::Spawning {
                normal_paused: false,
            };
            info!("normal spawning resumed");
            out.push(Event::NormalSpawningResumed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_interval_decays_to_its_floor() {
        let timeline = SpawnTimeline {
            base_interval: Duration::from_secs(2),
            min_interval: Duration::from_millis(500),
            interval_decay_per_second: 0.01,
            ..SpawnTimeline::default()
        };
        let mut scheduler = SpawnScheduler::new(Arc::new(timeline), 1);

        assert_eq!(scheduler.current_base_interval(), Duration::from_secs(2));
        scheduler.elapsed = Duration::from_secs(100);
        let interval = scheduler.current_base_interval();
        assert!((interval.as_secs_f32() - 1.0).abs() < 1e-4);
        scheduler.elapsed = Duration::from_secs(1_000);
        assert_eq!(scheduler.current_base_interval(), Duration::from_millis(500));
    }

    #[test]
    fn base_count_grows_per_whole_minute() {
        let timeline = SpawnTimeline {
            base_spawn_count: 2,
            spawn_count_growth_per_minute: 3,
            ..SpawnTimeline::default()
        };
        let mut scheduler = SpawnScheduler::new(Arc::new(timeline), 1);

        scheduler.elapsed = Duration::from_secs(59);
        assert_eq!(scheduler.current_base_count(), 2);
        scheduler.elapsed = Duration::from_secs(150);
        assert_eq!(scheduler.current_base_count(), 8);
    }
}
