//! Headless driver that feeds ticks and steering into a world.

use std::time::Duration;

use horde_core::{Command, Event, Vec2};
use horde_system_analytics::{Analytics, RunStats};
use horde_world::{apply, query, World};

/// Radius of the circle the autopilot walks around the arena centre.
const ORBIT_RADIUS: f32 = 250.0;

pub(crate) struct Session {
    world: World,
    analytics: Analytics,
    events: Vec<Event>,
}

impl Session {
    pub(crate) fn new(world: World) -> Self {
        Self {
            world,
            analytics: Analytics::new(),
            events: Vec::new(),
        }
    }

    /// Starts spawning and ticks until `duration` elapsed or the player died.
    pub(crate) fn run(&mut self, duration: Duration, dt: Duration) -> &RunStats {
        self.submit(Command::StartSpawning);
        let mut elapsed = Duration::ZERO;
        while elapsed < duration && !query::is_game_over(&self.world) {
            let direction = steer(query::player(&self.world).position);
            self.submit(Command::SetMoveInput { direction });
            self.submit(Command::Tick { dt });
            elapsed = elapsed.saturating_add(dt);
        }
        self.submit(Command::StopSpawning);
        self.analytics.stats()
    }

    fn submit(&mut self, command: Command) {
        apply(&mut self.world, command, &mut self.events);
        self.analytics.handle(&self.events);
        self.events.clear();
    }
}

/// Walks the circle of [`ORBIT_RADIUS`] counter-clockwise, drifting back onto
/// it when off course.
fn steer(position: Vec2) -> Vec2 {
    let distance = position.length();
    if distance < f32::EPSILON {
        return Vec2::X;
    }
    let radial = position / distance;
    let correction = (ORBIT_RADIUS - distance) / ORBIT_RADIUS;
    (radial.perp() + radial * correction).normalize_or_zero()
}
