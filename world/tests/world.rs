use std::time::Duration;

use horde_core::{Command, EntityRef, Event, GameConfig, SpawnRejection, Vec2};
use horde_world::{apply, query, World, FIXED_STEP};

fn world_from(targeting_radius: f32, extra: &str) -> World {
    let source = format!(
        r#"
seed = 7

[character]
max_health = 100.0
attack_power = 100.0
crit_chance = 0.0
crit_multiplier = 1.0
invincibility_duration = 0.5
pickup_range = 20.0

[weapon]
cooldown = 0.1
projectile_count = 1
projectile_speed = 600.0
lifetime = 2.0
projectile_radius = 6.0
targeting_radius = {targeting_radius:.1}

{extra}"#
    );
    let config = GameConfig::from_toml_str(&source)
        .expect("config parses")
        .resolve()
        .expect("config resolves");
    World::new(config)
}

fn run(world: &mut World, ticks: usize, events: &mut Vec<Event>) {
    for _ in 0..ticks {
        apply(world, Command::Tick { dt: FIXED_STEP }, events);
    }
}

fn count(events: &[Event], predicate: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

fn dummy_world() -> World {
    world_from(
        1000.0,
        r#"
[[hostiles]]
id = "dummy"
max_health = 10.0
move_speed = 0.0
contact_damage = 0.0
exp_reward = 5.0
gold_drop_chance = 1.0
min_gold = 2
max_gold = 2

[timeline]
base_interval = 1.0
min_interval = 1.0
interval_decay_per_second = 0.0
min_spawn_distance = 100.0
max_spawn_distance = 100.0
base_spawn_count = 1
spawn_count_growth_per_minute = 0
health_growth_per_minute = 0.0
speed_growth_per_minute = 0.0
base_hostiles = ["dummy"]
"#,
    )
}

#[test]
fn killing_a_hostile_pays_out_and_returns_it_to_its_pool() {
    let mut world = dummy_world();
    let mut events = Vec::new();
    apply(&mut world, Command::StartSpawning, &mut events);

    run(&mut world, 110, &mut events);

    assert_eq!(
        count(&events, |event| matches!(event, Event::HostileSpawned { .. })),
        1
    );
    assert_eq!(
        count(&events, |event| matches!(
            event,
            Event::Died {
                entity: EntityRef::Hostile(_)
            }
        )),
        1
    );
    assert_eq!(
        count(&events, |event| matches!(event, Event::HostileReleased { .. })),
        1
    );
    assert!(events.contains(&Event::ExperienceGained { amount: 5.0 }));

    let player = query::player(&world);
    assert_eq!(player.level, 1);
    assert_eq!(player.experience, 5.0);
    assert_eq!(player.gold, 0);

    let pickups = query::gold_pickups(&world);
    assert_eq!(pickups.len(), 1);
    assert_eq!(pickups[0].amount, 2);

    assert_eq!(query::live_hostile_count(&world), 0);
    let info = query::hostile_pool_info(&world, "dummy").expect("dummy pool");
    assert_eq!(info.active, 0);
    assert!(query::hostiles(&world).is_empty());
}

#[test]
fn lethal_contact_ends_the_run_and_freezes_input() {
    let mut world = world_from(
        5.0,
        r#"
[[hostiles]]
id = "brute"
max_health = 50.0
move_speed = 0.0
contact_damage = 1000.0

[timeline]
base_interval = 1.0
min_interval = 1.0
min_spawn_distance = 10.0
max_spawn_distance = 10.0
base_spawn_count = 1
spawn_count_growth_per_minute = 0
base_hostiles = ["brute"]
"#,
    );
    let mut events = Vec::new();
    apply(&mut world, Command::StartSpawning, &mut events);

    run(&mut world, 62, &mut events);

    assert_eq!(count(&events, |event| *event == Event::GameOver), 1);
    assert!(events.contains(&Event::Died {
        entity: EntityRef::Player
    }));
    assert!(query::is_game_over(&world));

    apply(
        &mut world,
        Command::SetMoveInput {
            direction: Vec2::X,
        },
        &mut events,
    );
    events.clear();
    run(&mut world, 60, &mut events);

    let player = query::player(&world);
    assert!(player.dead);
    assert!(player.input_frozen);
    assert_eq!(player.position, Vec2::ZERO);
    assert_eq!(player.health, 0.0);
    assert_eq!(count(&events, |event| *event == Event::GameOver), 0);
}

#[test]
fn contact_against_an_invincible_player_still_spends_the_cooldown() {
    let mut world = world_from(
        5.0,
        r#"
[[hostiles]]
id = "biter"
move_speed = 0.0
contact_damage = 10.0
attack_cooldown = 0.2

[timeline]
base_interval = 1.0
min_interval = 1.0
min_spawn_distance = 10.0
max_spawn_distance = 10.0
base_spawn_count = 1
spawn_count_growth_per_minute = 0
base_hostiles = ["biter"]
"#,
    );
    let player_hits = |events: &[Event]| {
        count(events, |event| {
            matches!(
                event,
                Event::Damaged {
                    entity: EntityRef::Player,
                    ..
                }
            )
        })
    };
    let mut events = Vec::new();
    apply(&mut world, Command::StartSpawning, &mut events);

    // First bite lands right after the spawn and opens a 0.5 s window.
    run(&mut world, 61, &mut events);
    assert_eq!(player_hits(&events), 1);

    // Bites at 0.2 s and 0.4 s fall inside the window and are spent, so the
    // next one is due at 0.6 s rather than when the window closes.
    run(&mut world, 34, &mut events);
    assert_eq!(player_hits(&events), 1);

    run(&mut world, 5, &mut events);
    assert_eq!(player_hits(&events), 2);
    assert_eq!(query::player(&world).health, 80.0);
}

#[test]
fn exhausted_pool_rejects_the_overflow() {
    let mut world = world_from(
        0.0,
        r#"
[pools]
hostile_initial_size = 2
auto_grow = false

[[hostiles]]
id = "slime"
move_speed = 0.0

[timeline]
base_interval = 1.0
min_interval = 1.0
min_spawn_distance = 600.0
max_spawn_distance = 600.0
base_spawn_count = 3
spawn_count_growth_per_minute = 0
base_hostiles = ["slime"]
"#,
    );
    let mut events = Vec::new();
    apply(&mut world, Command::StartSpawning, &mut events);

    run(&mut world, 60, &mut events);

    assert_eq!(
        count(&events, |event| matches!(event, Event::HostileSpawned { .. })),
        2
    );
    assert!(events.contains(&Event::SpawnRejected {
        kind: "slime".to_owned(),
        reason: SpawnRejection::PoolExhausted,
    }));
    let info = query::hostile_pool_info(&world, "slime").expect("slime pool");
    assert_eq!(info.total, 2);
    assert_eq!(info.idle, 0);
    assert_eq!(query::live_hostile_count(&world), 2);
}

#[test]
fn obstacles_stop_projectiles_before_they_reach_hostiles() {
    let mut world = dummy_world();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::AddObstacle {
            center: Vec2::ZERO,
            radius: 50.0,
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::AddObstacle {
            center: Vec2::ONE,
            radius: -1.0,
        },
        &mut events,
    );
    assert_eq!(query::obstacles(&world).len(), 1);

    apply(&mut world, Command::StartSpawning, &mut events);
    run(&mut world, 90, &mut events);

    let fired = count(&events, |event| matches!(event, Event::ProjectileFired { .. }));
    let released = count(&events, |event| {
        matches!(event, Event::ProjectileReleased { .. })
    });
    assert!(fired > 0);
    assert!(fired - released <= 1);
    assert_eq!(
        count(&events, |event| matches!(event, Event::ProjectileHit { .. })),
        0
    );

    let hostiles = query::hostiles(&world);
    assert_eq!(hostiles.len(), 1);
    assert_eq!(hostiles[0].health, hostiles[0].max_health);
}

#[test]
fn coarse_ticks_still_land_hits() {
    let mut world = dummy_world();
    let mut events = Vec::new();
    apply(&mut world, Command::StartSpawning, &mut events);

    for _ in 0..20 {
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
    }

    let hits = count(&events, |event| matches!(event, Event::ProjectileHit { .. }));
    let kills = count(&events, |event| {
        matches!(
            event,
            Event::Died {
                entity: EntityRef::Hostile(_)
            }
        )
    });
    assert!(hits >= 3, "only {hits} hits landed");
    assert_eq!(kills, hits);
    assert_eq!(
        count(&events, |event| matches!(event, Event::ExperienceGained { .. })),
        kills
    );
}

#[test]
fn despawn_all_returns_every_live_hostile() {
    let mut world = world_from(
        0.0,
        r#"
[[hostiles]]
id = "slime"
move_speed = 0.0

[timeline]
base_interval = 1.0
min_interval = 1.0
min_spawn_distance = 600.0
max_spawn_distance = 600.0
base_spawn_count = 3
spawn_count_growth_per_minute = 0
base_hostiles = ["slime"]
"#,
    );
    let mut events = Vec::new();
    apply(&mut world, Command::StartSpawning, &mut events);
    run(&mut world, 60, &mut events);
    assert_eq!(query::live_hostile_count(&world), 3);

    events.clear();
    apply(&mut world, Command::DespawnAll, &mut events);

    assert_eq!(
        count(&events, |event| matches!(event, Event::HostileReleased { .. })),
        3
    );
    assert_eq!(query::live_hostile_count(&world), 0);
    let info = query::hostile_pool_info(&world, "slime").expect("slime pool");
    assert_eq!(info.active, 0);
    assert!(query::hostiles(&world).is_empty());
}

#[test]
fn movement_follows_input_and_healing_clamps_at_full() {
    let mut world = world_from(0.0, "");
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::SetMoveInput {
            direction: Vec2::new(3.0, 0.0),
        },
        &mut events,
    );
    run(&mut world, 60, &mut events);

    let player = query::player(&world);
    assert!((player.position.x - 200.0).abs() < 0.01);
    assert_eq!(player.position.y, 0.0);

    events.clear();
    apply(&mut world, Command::HealPlayer { amount: 25.0 }, &mut events);
    assert!(events.is_empty());
    assert_eq!(query::player(&world).health, 100.0);
}
