#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reusable-object pools for short-lived entities.
//!
//! A [`ResourcePool`] owns every instance it ever created from its prototype.
//! Idle instances sit on a stack; acquiring pops one and activates it, while
//! releasing deactivates it and pushes it back. When the stack runs dry the
//! pool either grows by a fixed increment or reports exhaustion, so callers
//! treat a `None` as "skip this action for the tick". No operation panics on
//! misuse: double releases and foreign handles are logged and ignored.

use horde_core::{Handle, PoolId, PoolInfo, Vec2};
use log::{info, warn};

mod registry;

pub use registry::{PoolError, PoolRegistry};

/// Lifecycle hooks invoked by a pool when an instance changes hands.
///
/// Both hooks default to doing nothing beyond the pool's own activation
/// bookkeeping.
pub trait Poolable {
    /// Called after the instance is popped from the idle stack.
    fn on_acquire(&mut self) {}

    /// Called before the instance is pushed back onto the idle stack.
    fn on_release(&mut self) {}
}

/// Instances that can be positioned when acquired.
pub trait Placeable {
    /// Moves the instance to `position` facing `rotation` radians.
    fn place(&mut self, position: Vec2, rotation: f32);
}

#[derive(Debug)]
struct Slot<T> {
    item: T,
    active: bool,
}

/// Fixed-capacity container of reusable instances with optional growth.
#[derive(Debug)]
pub struct ResourcePool<T> {
    id: PoolId,
    key: String,
    prototype: T,
    slots: Vec<Slot<T>>,
    idle: Vec<u32>,
    auto_grow: bool,
    grow_increment: usize,
    expansions: usize,
    retired: bool,
}

impl<T: Clone + Poolable> ResourcePool<T> {
    /// Creates a pool and instantiates `initial_size` idle clones of `prototype`.
    #[must_use]
    pub fn new(
        id: PoolId,
        key: impl Into<String>,
        prototype: T,
        initial_size: usize,
        auto_grow: bool,
        grow_increment: usize,
    ) -> Self {
        let mut pool = Self {
            id,
            key: key.into(),
            prototype,
            slots: Vec::with_capacity(initial_size),
            idle: Vec::with_capacity(initial_size),
            auto_grow,
            grow_increment: grow_increment.max(1),
            expansions: 0,
            retired: false,
        };
        pool.instantiate(initial_size);
        pool
    }

    /// Pops an idle instance and activates it.
    ///
    /// Grows the pool by the configured increment when empty and auto-grow is
    /// enabled; otherwise logs a warning and returns `None`.
    pub fn acquire(&mut self) -> Option<Handle> {
        let slot = self.pop_idle()?;
        Some(self.activate(slot))
    }

    /// Acquires an instance and places it before running the acquire hook.
    pub fn acquire_at(&mut self, position: Vec2, rotation: f32) -> Option<Handle>
    where
        T: Placeable,
    {
        let slot = self.pop_idle()?;
        self.slots[slot as usize].item.place(position, rotation);
        Some(self.activate(slot))
    }

    /// Returns an active instance to the idle stack.
    ///
    /// Releasing an idle, foreign, or unknown handle logs a warning and leaves
    /// the pool untouched. Returns whether the instance was released.
    pub fn release(&mut self, handle: Handle) -> bool {
        if self.retired {
            warn!("release on cleared pool '{}' ignored", self.key);
            return false;
        }
        if handle.pool() != self.id {
            warn!(
                "pool '{}' refused handle {:?} owned by another pool",
                self.key, handle
            );
            return false;
        }
        let Some(slot) = self.slots.get_mut(handle.slot() as usize) else {
            warn!("pool '{}' has no slot {}", self.key, handle.slot());
            return false;
        };
        if !slot.active {
            warn!(
                "pool '{}' slot {} released twice; ignoring",
                self.key,
                handle.slot()
            );
            return false;
        }

        slot.item.on_release();
        slot.active = false;
        self.idle.push(handle.slot());
        true
    }

    /// Releases every active instance. Returns the number released.
    pub fn release_all(&mut self) -> usize {
        let active: Vec<Handle> = self.active_handles().collect();
        active
            .into_iter()
            .filter(|handle| self.release(*handle))
            .count()
    }

    /// Instantiates `count` additional idle instances.
    pub fn prewarm(&mut self, count: usize) {
        if self.retired {
            warn!("prewarm on cleared pool '{}' ignored", self.key);
            return;
        }
        self.instantiate(count);
    }

    fn pop_idle(&mut self) -> Option<u32> {
        if self.retired {
            warn!("acquire on cleared pool '{}' ignored", self.key);
            return None;
        }

        if self.idle.is_empty() {
            if !self.auto_grow {
                warn!(
                    "pool '{}' exhausted at {} instances and auto-grow is disabled",
                    self.key,
                    self.slots.len()
                );
                return None;
            }
            self.instantiate(self.grow_increment);
            self.expansions += 1;
            info!(
                "pool '{}' expanded by {} to {} instances",
                self.key,
                self.grow_increment,
                self.slots.len()
            );
        }

        self.idle.pop()
    }

    fn activate(&mut self, slot: u32) -> Handle {
        let entry = &mut self.slots[slot as usize];
        entry.active = true;
        entry.item.on_acquire();
        Handle::new(self.id, slot)
    }

    fn instantiate(&mut self, count: usize) {
        let first = self.slots.len();
        self.slots.reserve(count);
        for _ in 0..count {
            self.slots.push(Slot {
                item: self.prototype.clone(),
                active: false,
            });
        }
        // Oldest instances sit on top of the stack so they are handed out first.
        self.idle
            .extend((first..self.slots.len()).rev().map(|slot| slot as u32));
    }
}

impl<T> ResourcePool<T> {
    /// Destroys every instance ever created and retires the pool.
    ///
    /// Outstanding handles stop resolving. The pool refuses further use until
    /// it is recreated.
    pub fn clear(&mut self) {
        info!(
            "pool '{}' cleared ({} instances destroyed)",
            self.key,
            self.slots.len()
        );
        self.slots.clear();
        self.idle.clear();
        self.retired = true;
    }

    /// Identifier allocated to the pool.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Key the pool was registered under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of instances waiting on the idle stack.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Number of instances the pool currently owns.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of instances handed out and not yet released.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.idle.len()
    }

    /// Bookkeeping counters bundled together.
    #[must_use]
    pub fn info(&self) -> PoolInfo {
        PoolInfo {
            idle: self.idle_count(),
            total: self.total_count(),
            active: self.active_count(),
        }
    }

    /// Number of times the pool grew because it ran dry.
    #[must_use]
    pub const fn expansions(&self) -> usize {
        self.expansions
    }

    /// Reports whether [`ResourcePool::clear`] retired the pool.
    #[must_use]
    pub const fn is_retired(&self) -> bool {
        self.retired
    }

    /// Reports whether the handle refers to an acquired instance of this pool.
    #[must_use]
    pub fn is_active(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Borrows an acquired instance.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        if handle.pool() != self.id {
            return None;
        }
        self.slots
            .get(handle.slot() as usize)
            .filter(|slot| slot.active)
            .map(|slot| &slot.item)
    }

    /// Mutably borrows an acquired instance.
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if handle.pool() != self.id {
            return None;
        }
        self.slots
            .get_mut(handle.slot() as usize)
            .filter(|slot| slot.active)
            .map(|slot| &mut slot.item)
    }

    /// Handles of every acquired instance in slot order.
    pub fn active_handles(&self) -> impl Iterator<Item = Handle> + '_ {
        let id = self.id;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(move |(index, _)| Handle::new(id, index as u32))
    }

    /// Iterates acquired instances in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        let id = self.id;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(move |(index, slot)| (Handle::new(id, index as u32), &slot.item))
    }

    /// Mutably iterates acquired instances in slot order.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> + '_ {
        let id = self.id;
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(move |(index, slot)| (Handle::new(id, index as u32), &mut slot.item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default)]
    struct Dummy;

    impl Poolable for Dummy {}

    #[test]
    fn zero_grow_increment_still_grows_by_one() {
        let mut pool = ResourcePool::new(PoolId::new(0), "dummy", Dummy, 0, true, 0);
        assert!(pool.acquire().is_some());
        assert_eq!(pool.total_count(), 1);
        assert_eq!(pool.expansions(), 1);
    }

    #[test]
    fn initial_batch_is_handed_out_in_creation_order() {
        let mut pool = ResourcePool::new(PoolId::new(0), "dummy", Dummy, 3, false, 1);
        let slots: Vec<u32> = (0..3)
            .filter_map(|_| pool.acquire())
            .map(|handle| handle.slot())
            .collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }
}
