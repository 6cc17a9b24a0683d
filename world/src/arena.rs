//! Adapters that expose world storage to the spawning and targeting systems.

use std::sync::Arc;

use horde_core::{Handle, HostileDescriptor, SpawnRejection, Vec2};
use horde_system_pool::PoolRegistry;
use horde_system_spawning::{HostileSpawner, SpawnModifiers};
use horde_system_targeting::{CandidateBuffer, CandidateSource, TargetCandidate};
use log::warn;

use crate::entities::Hostile;

/// Spawns hostiles out of the per-kind pools.
///
/// Releases are recorded so the world can announce them afterwards.
pub(crate) struct ArenaSpawner<'a> {
    hostiles: &'a mut PoolRegistry<Hostile>,
    pub(crate) released: Vec<Handle>,
}

impl<'a> ArenaSpawner<'a> {
    pub(crate) fn new(hostiles: &'a mut PoolRegistry<Hostile>) -> Self {
        Self {
            hostiles,
            released: Vec::new(),
        }
    }
}

impl HostileSpawner for ArenaSpawner<'_> {
    fn spawn(
        &mut self,
        descriptor: &Arc<HostileDescriptor>,
        position: Vec2,
        modifiers: SpawnModifiers,
    ) -> Result<Handle, SpawnRejection> {
        if !self.hostiles.has_pool(&descriptor.id) {
            warn!("no hostile pool for '{}'", descriptor.id);
            return Err(SpawnRejection::UnknownPool);
        }
        let handle = self
            .hostiles
            .acquire_at(&descriptor.id, position, 0.0)
            .ok_or(SpawnRejection::PoolExhausted)?;
        match self.hostiles.get_mut(handle) {
            Some(hostile) => {
                hostile.revive(handle, modifiers);
                Ok(handle)
            }
            None => Err(SpawnRejection::UnknownPool),
        }
    }

    fn despawn(&mut self, hostile: Handle) -> bool {
        let released = self.hostiles.release_handle(hostile);
        if released {
            self.released.push(hostile);
        }
        released
    }
}

/// Read-only view of engaged hostiles for target queries.
pub(crate) struct HostileField<'a> {
    pub(crate) hostiles: &'a PoolRegistry<Hostile>,
}

impl CandidateSource for HostileField<'_> {
    fn overlap(&self, origin: Vec2, radius: f32, buffer: &mut CandidateBuffer) {
        for (handle, hostile) in self.hostiles.iter_active() {
            if hostile.position.distance(origin) > radius {
                continue;
            }
            let candidate = TargetCandidate {
                handle,
                position: hostile.position,
                active: hostile.is_engaged(),
            };
            if !buffer.push(candidate) {
                break;
            }
        }
    }
}
