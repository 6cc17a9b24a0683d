//! Configuration schema, validation, and descriptor resolution.
//!
//! Configuration is authored as TOML. [`GameConfig`] mirrors the file layout
//! with descriptor references expressed as string identifiers, and
//! [`GameConfig::resolve`] validates every value before turning those
//! references into shared [`Arc`] descriptors consumed by the runtime.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptors::{
    BossSpawnEntry, CharacterDescriptor, HostileDescriptor, PoolConfig, ProgressionConfig,
    SpawnTimeline, SpawnWaveEntry, WeaponDescriptor,
};

/// Default configuration shipped with the engine.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../assets/horde.toml");

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration at {path}")]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid TOML for the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A hostile descriptor has an empty identifier.
    #[error("hostile descriptor at index {index} has an empty id")]
    EmptyHostileId {
        /// Position of the descriptor in the hostile list.
        index: usize,
    },
    /// Two hostile descriptors share an identifier.
    #[error("hostile descriptor `{0}` is defined more than once")]
    DuplicateHostile(String),
    /// A descriptor reference does not name a known hostile.
    #[error("{context} references unknown hostile `{id}`")]
    UnknownHostile {
        /// Identifier that failed to resolve.
        id: String,
        /// Location of the reference.
        context: String,
    },
    /// A value lies outside its permitted range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// Human readable explanation.
        reason: String,
    },
}

/// Top-level configuration document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for every random stream of a run.
    pub seed: u64,
    /// Player stat template.
    pub character: CharacterDescriptor,
    /// Player weapon template.
    pub weapon: WeaponDescriptor,
    /// Experience curve.
    pub progression: ProgressionConfig,
    /// Pool sizing.
    pub pools: PoolConfig,
    /// Hostile stat templates.
    pub hostiles: Vec<HostileDescriptor>,
    /// Spawn timeline with string descriptor references.
    pub timeline: TimelineConfig,
}

/// Spawn timeline as authored, with times expressed in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Base cadence interval in seconds.
    pub base_interval: f32,
    /// Floor of the base cadence interval in seconds.
    pub min_interval: f32,
    /// Seconds removed from the base interval per elapsed second.
    pub interval_decay_per_second: f32,
    /// Inner radius of the spawn annulus.
    pub min_spawn_distance: f32,
    /// Outer radius of the spawn annulus.
    pub max_spawn_distance: f32,
    /// Live hostile cap.
    pub max_population: usize,
    /// Hostiles per base cadence firing at minute zero.
    pub base_spawn_count: u32,
    /// Extra hostiles per base firing per elapsed whole minute.
    pub spawn_count_growth_per_minute: u32,
    /// Fractional health growth per elapsed minute.
    pub health_growth_per_minute: f32,
    /// Fractional speed growth per elapsed minute.
    pub speed_growth_per_minute: f32,
    /// Hostile identifiers used by the base cadence.
    pub base_hostiles: Vec<String>,
    /// Recurring waves.
    pub waves: Vec<WaveConfig>,
    /// Boss triggers.
    pub bosses: Vec<BossConfig>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        let defaults = SpawnTimeline::default();
        Self {
            base_interval: defaults.base_interval.as_secs_f32(),
            min_interval: defaults.min_interval.as_secs_f32(),
            interval_decay_per_second: defaults.interval_decay_per_second,
            min_spawn_distance: defaults.min_spawn_distance,
            max_spawn_distance: defaults.max_spawn_distance,
            max_population: defaults.max_population,
            base_spawn_count: defaults.base_spawn_count,
            spawn_count_growth_per_minute: defaults.spawn_count_growth_per_minute,
            health_growth_per_minute: defaults.health_growth_per_minute,
            speed_growth_per_minute: defaults.speed_growth_per_minute,
            base_hostiles: Vec::new(),
            waves: Vec::new(),
            bosses: Vec::new(),
        }
    }
}

/// Authored wave entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Seconds after start at which the wave activates.
    pub start_time: f32,
    /// Hostile identifier.
    pub hostile: String,
    /// Seconds between firings.
    pub interval: f32,
    /// Hostiles per firing.
    pub count: u32,
    /// Health multiplier.
    #[serde(default = "unit_multiplier")]
    pub health_mult: f32,
    /// Speed multiplier.
    #[serde(default = "unit_multiplier")]
    pub speed_mult: f32,
}

/// Authored boss entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    /// Seconds after start at which the boss appears.
    pub time: f32,
    /// Hostile identifier.
    pub hostile: String,
    /// Whether normal spawning pauses until the boss dies.
    #[serde(default)]
    pub pause_normal: bool,
    /// Health multiplier.
    #[serde(default = "unit_multiplier")]
    pub health_mult: f32,
}

fn unit_multiplier() -> f32 {
    1.0
}

/// Validated configuration with descriptor references resolved.
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    /// Seed for every random stream of a run.
    pub seed: u64,
    /// Shared player stat template.
    pub character: Arc<CharacterDescriptor>,
    /// Shared weapon template.
    pub weapon: Arc<WeaponDescriptor>,
    /// Experience curve.
    pub progression: ProgressionConfig,
    /// Pool sizing.
    pub pools: PoolConfig,
    /// Every hostile descriptor in authored order.
    pub hostiles: Vec<Arc<HostileDescriptor>>,
    /// Shared spawn timeline.
    pub timeline: Arc<SpawnTimeline>,
}

impl GameConfig {
    /// Parses a configuration document from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|err| {
            error!("configuration rejected: {err}");
            ConfigError::from(err)
        })
    }

    /// Reads and parses a configuration document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| {
            error!("failed to read configuration at {}", path.display());
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses the configuration embedded in the engine.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
    }

    /// Validates every value and resolves descriptor references.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        self.resolve_inner().map_err(|err| {
            error!("configuration rejected: {err}");
            err
        })
    }

    fn resolve_inner(&self) -> Result<ResolvedConfig, ConfigError> {
        validate_character(&self.character)?;
        validate_weapon(&self.weapon)?;
        validate_progression(&self.progression)?;

        let mut by_id: HashMap<&str, Arc<HostileDescriptor>> = HashMap::new();
        let mut hostiles = Vec::with_capacity(self.hostiles.len());
        for (index, descriptor) in self.hostiles.iter().enumerate() {
            if descriptor.id.is_empty() {
                return Err(ConfigError::EmptyHostileId { index });
            }
            validate_hostile(descriptor)?;
            let shared = Arc::new(descriptor.clone());
            if by_id.insert(descriptor.id.as_str(), Arc::clone(&shared)).is_some() {
                return Err(ConfigError::DuplicateHostile(descriptor.id.clone()));
            }
            hostiles.push(shared);
        }

        let timeline = resolve_timeline(&self.timeline, &by_id)?;

        Ok(ResolvedConfig {
            seed: self.seed,
            character: Arc::new(self.character.clone()),
            weapon: Arc::new(self.weapon.clone()),
            progression: self.progression,
            pools: self.pools,
            hostiles,
            timeline: Arc::new(timeline),
        })
    }
}

fn resolve_timeline(
    config: &TimelineConfig,
    by_id: &HashMap<&str, Arc<HostileDescriptor>>,
) -> Result<SpawnTimeline, ConfigError> {
    let base_interval = positive_seconds("timeline.base_interval", config.base_interval)?;
    let min_interval = positive_seconds("timeline.min_interval", config.min_interval)?;
    non_negative("timeline.interval_decay_per_second", config.interval_decay_per_second)?;
    non_negative("timeline.min_spawn_distance", config.min_spawn_distance)?;
    non_negative("timeline.health_growth_per_minute", config.health_growth_per_minute)?;
    non_negative("timeline.speed_growth_per_minute", config.speed_growth_per_minute)?;
    if !(config.max_spawn_distance >= config.min_spawn_distance) {
        return Err(invalid(
            "timeline.max_spawn_distance",
            "must not be smaller than min_spawn_distance",
        ));
    }

    let lookup = |id: &str, context: String| {
        by_id
            .get(id)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownHostile {
                id: id.to_owned(),
                context,
            })
    };

    let mut base_hostiles = Vec::with_capacity(config.base_hostiles.len());
    for (index, id) in config.base_hostiles.iter().enumerate() {
        base_hostiles.push(lookup(id, format!("timeline.base_hostiles[{index}]"))?);
    }

    let mut waves = Vec::with_capacity(config.waves.len());
    for (index, wave) in config.waves.iter().enumerate() {
        let prefix = format!("timeline.waves[{index}]");
        waves.push(SpawnWaveEntry {
            start_time: seconds(&format!("{prefix}.start_time"), wave.start_time)?,
            hostile: lookup(&wave.hostile, prefix.clone())?,
            interval: positive_seconds(&format!("{prefix}.interval"), wave.interval)?,
            count: wave.count,
            health_mult: positive(&format!("{prefix}.health_mult"), wave.health_mult)?,
            speed_mult: positive(&format!("{prefix}.speed_mult"), wave.speed_mult)?,
        });
    }

    let mut bosses = Vec::with_capacity(config.bosses.len());
    for (index, boss) in config.bosses.iter().enumerate() {
        let prefix = format!("timeline.bosses[{index}]");
        bosses.push(BossSpawnEntry {
            time: seconds(&format!("{prefix}.time"), boss.time)?,
            hostile: lookup(&boss.hostile, prefix.clone())?,
            pause_normal: boss.pause_normal,
            health_mult: positive(&format!("{prefix}.health_mult"), boss.health_mult)?,
        });
    }
    bosses.sort_by_key(|boss| boss.time);

    Ok(SpawnTimeline {
        base_interval,
        min_interval,
        interval_decay_per_second: config.interval_decay_per_second,
        min_spawn_distance: config.min_spawn_distance,
        max_spawn_distance: config.max_spawn_distance,
        max_population: config.max_population,
        base_spawn_count: config.base_spawn_count,
        spawn_count_growth_per_minute: config.spawn_count_growth_per_minute,
        health_growth_per_minute: config.health_growth_per_minute,
        speed_growth_per_minute: config.speed_growth_per_minute,
        base_hostiles,
        waves,
        bosses,
    })
}

fn validate_character(character: &CharacterDescriptor) -> Result<(), ConfigError> {
    let _ = positive("character.max_health", character.max_health)?;
    non_negative("character.health_regen", character.health_regen)?;
    non_negative("character.move_speed", character.move_speed)?;
    non_negative("character.attack_power", character.attack_power)?;
    let _ = positive("character.attack_speed", character.attack_speed)?;
    unit_interval("character.crit_chance", character.crit_chance)?;
    if !(character.crit_multiplier >= 1.0) {
        return Err(invalid("character.crit_multiplier", "must be at least 1"));
    }
    non_negative("character.defense", character.defense)?;
    let _ = seconds(
        "character.invincibility_duration",
        character.invincibility_duration,
    )?;
    non_negative("character.exp_multiplier", character.exp_multiplier)?;
    non_negative("character.pickup_range", character.pickup_range)
}

fn validate_weapon(weapon: &WeaponDescriptor) -> Result<(), ConfigError> {
    let _ = positive_seconds("weapon.cooldown", weapon.cooldown)?;
    let _ = positive_seconds("weapon.lifetime", weapon.lifetime)?;
    non_negative("weapon.angle_step_degrees", weapon.angle_step_degrees)?;
    non_negative("weapon.projectile_speed", weapon.projectile_speed)?;
    non_negative("weapon.targeting_radius", weapon.targeting_radius)?;
    non_negative("weapon.projectile_radius", weapon.projectile_radius)?;
    non_negative("weapon.knockback_force", weapon.knockback_force)
}

fn validate_progression(progression: &ProgressionConfig) -> Result<(), ConfigError> {
    let _ = positive("progression.base_requirement", progression.base_requirement)?;
    if !(progression.scaling_factor >= 1.0) {
        return Err(invalid("progression.scaling_factor", "must be at least 1"));
    }
    Ok(())
}

fn validate_hostile(hostile: &HostileDescriptor) -> Result<(), ConfigError> {
    let prefix = format!("hostiles.{}", hostile.id);
    let _ = positive(&format!("{prefix}.max_health"), hostile.max_health)?;
    non_negative(&format!("{prefix}.move_speed"), hostile.move_speed)?;
    non_negative(&format!("{prefix}.contact_damage"), hostile.contact_damage)?;
    let _ = seconds(&format!("{prefix}.attack_cooldown"), hostile.attack_cooldown)?;
    non_negative(&format!("{prefix}.exp_reward"), hostile.exp_reward)?;
    unit_interval(&format!("{prefix}.gold_drop_chance"), hostile.gold_drop_chance)?;
    unit_interval(
        &format!("{prefix}.knockback_resistance"),
        hostile.knockback_resistance,
    )?;
    non_negative(&format!("{prefix}.radius"), hostile.radius)?;
    non_negative(&format!("{prefix}.defense"), hostile.defense)?;
    if hostile.min_gold > hostile.max_gold {
        return Err(invalid(
            &format!("{prefix}.min_gold"),
            "must not exceed max_gold",
        ));
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite, non-negative number"))
    }
}

fn positive(field: &str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(field, "must be a finite, positive number"))
    }
}

fn unit_interval(field: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must lie within [0, 1]"))
    }
}

fn seconds(field: &str, value: f32) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f32(value).map_err(|_| invalid(field, "must be a valid number of seconds"))
}

fn positive_seconds(field: &str, value: f32) -> Result<Duration, ConfigError> {
    let duration = seconds(field, value)?;
    if duration.is_zero() {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        seed = 3

        [[hostiles]]
        id = "slime"
        max_health = 20.0

        [timeline]
        base_hostiles = ["slime"]

        [[timeline.waves]]
        start_time = 10.0
        hostile = "slime"
        interval = 2.0
        count = 3
    "#;

    #[test]
    fn builtin_configuration_resolves() {
        let config = GameConfig::builtin().expect("builtin config parses");
        let resolved = config.resolve().expect("builtin config resolves");
        assert!(!resolved.hostiles.is_empty());
        assert!(!resolved.timeline.base_hostiles.is_empty());
    }

    #[test]
    fn wave_references_share_descriptor_instances() {
        let resolved = GameConfig::from_toml_str(MINIMAL)
            .expect("parse")
            .resolve()
            .expect("resolve");
        let wave = &resolved.timeline.waves[0];
        assert!(Arc::ptr_eq(&wave.hostile, &resolved.hostiles[0]));
        assert!(Arc::ptr_eq(
            &resolved.timeline.base_hostiles[0],
            &resolved.hostiles[0]
        ));
        assert_eq!(wave.interval, Duration::from_secs(2));
        assert!((wave.health_mult - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_wave_hostile_is_rejected() {
        let mut config = GameConfig::from_toml_str(MINIMAL).expect("parse");
        config.timeline.waves[0].hostile = "ghost".to_owned();
        match config.resolve() {
            Err(ConfigError::UnknownHostile { id, .. }) => assert_eq!(id, "ghost"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn zero_wave_interval_is_rejected() {
        let mut config = GameConfig::from_toml_str(MINIMAL).expect("parse");
        config.timeline.waves[0].interval = 0.0;
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn inverted_spawn_annulus_is_rejected() {
        let mut config = GameConfig::from_toml_str(MINIMAL).expect("parse");
        config.timeline.min_spawn_distance = 500.0;
        config.timeline.max_spawn_distance = 100.0;
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn duplicate_hostile_ids_are_rejected() {
        let mut config = GameConfig::from_toml_str(MINIMAL).expect("parse");
        let duplicate = config.hostiles[0].clone();
        config.hostiles.push(duplicate);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::DuplicateHostile(id)) if id == "slime"
        ));
    }

    #[test]
    fn bosses_are_sorted_by_trigger_time() {
        let mut config = GameConfig::from_toml_str(MINIMAL).expect("parse");
        config.timeline.bosses = vec![
            BossConfig {
                time: 90.0,
                hostile: "slime".to_owned(),
                pause_normal: false,
                health_mult: 1.0,
            },
            BossConfig {
                time: 30.0,
                hostile: "slime".to_owned(),
                pause_normal: true,
                health_mult: 4.0,
            },
        ];
        let resolved = config.resolve().expect("resolve");
        let times: Vec<_> = resolved.timeline.bosses.iter().map(|boss| boss.time).collect();
        assert_eq!(times, vec![Duration::from_secs(30), Duration::from_secs(90)]);
    }
}
