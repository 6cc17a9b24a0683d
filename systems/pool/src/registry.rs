use std::collections::{BTreeMap, HashMap};

use horde_core::{Handle, PoolId, PoolInfo, Vec2};
use log::{error, info, warn};
use thiserror::Error;

use crate::{Placeable, Poolable, ResourcePool};

/// Reasons a registry operation may be refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Pools must be registered under a non-empty key.
    #[error("pool key must not be empty")]
    EmptyKey,
    /// A pool already exists under the requested key.
    #[error("a pool named `{0}` already exists")]
    DuplicateKey(String),
    /// No pool exists under the requested key.
    #[error("no pool named `{0}`")]
    UnknownPool(String),
}

/// Named collection of pools sharing one instance type.
///
/// Every pool receives a fresh [`PoolId`], so handles resolve back to the
/// pool that minted them without consulting the key. Iteration visits pools in
/// key order.
#[derive(Debug)]
pub struct PoolRegistry<T> {
    pools: BTreeMap<String, ResourcePool<T>>,
    keys_by_id: HashMap<PoolId, String>,
    next_id: u32,
}

impl<T> Default for PoolRegistry<T> {
    fn default() -> Self {
        Self {
            pools: BTreeMap::new(),
            keys_by_id: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone + Poolable> PoolRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pool built from `prototype`.
    ///
    /// Empty or duplicate keys are logged and refused; the existing pool is
    /// left untouched.
    pub fn create_pool(
        &mut self,
        key: impl Into<String>,
        prototype: T,
        initial_size: usize,
        auto_grow: bool,
        grow_increment: usize,
    ) -> Result<PoolId, PoolError> {
        let key = key.into();
        if key.is_empty() {
            error!("refusing to create a pool with an empty key");
            return Err(PoolError::EmptyKey);
        }
        if self.pools.contains_key(&key) {
            warn!("pool '{key}' already exists; create ignored");
            return Err(PoolError::DuplicateKey(key));
        }

        let id = PoolId::new(self.next_id);
        self.next_id += 1;
        let pool = ResourcePool::new(
            id,
            key.clone(),
            prototype,
            initial_size,
            auto_grow,
            grow_increment,
        );
        info!(
            "pool '{key}' created with {initial_size} instances (auto-grow: {auto_grow})"
        );
        let _ = self.keys_by_id.insert(id, key.clone());
        let _ = self.pools.insert(key, pool);
        Ok(id)
    }

    /// Acquires an instance from the pool registered under `key`.
    pub fn acquire(&mut self, key: &str) -> Option<Handle> {
        self.pool_mut_or_warn(key)?.acquire()
    }

    /// Acquires and places an instance from the pool registered under `key`.
    pub fn acquire_at(&mut self, key: &str, position: Vec2, rotation: f32) -> Option<Handle>
    where
        T: Placeable,
    {
        self.pool_mut_or_warn(key)?.acquire_at(position, rotation)
    }

    /// Returns an instance to the pool registered under `key`.
    pub fn release(&mut self, key: &str, handle: Handle) -> bool {
        match self.pool_mut_or_warn(key) {
            Some(pool) => pool.release(handle),
            None => false,
        }
    }

    /// Returns an instance to whichever pool minted the handle.
    pub fn release_handle(&mut self, handle: Handle) -> bool {
        match self.owner_mut(handle) {
            Some(pool) => pool.release(handle),
            None => {
                warn!("no pool owns handle {handle:?}; release ignored");
                false
            }
        }
    }

    /// Releases every active instance in every pool. Returns the number released.
    pub fn release_all(&mut self) -> usize {
        self.pools.values_mut().map(ResourcePool::release_all).sum()
    }

    /// Instantiates `count` extra idle instances in the pool under `key`.
    pub fn prewarm(&mut self, key: &str, count: usize) -> Result<(), PoolError> {
        let pool = self
            .pools
            .get_mut(key)
            .ok_or_else(|| PoolError::UnknownPool(key.to_owned()))?;
        pool.prewarm(count);
        Ok(())
    }

    fn pool_mut_or_warn(&mut self, key: &str) -> Option<&mut ResourcePool<T>> {
        let pool = self.pools.get_mut(key);
        if pool.is_none() {
            warn!("no pool named '{key}'");
        }
        pool
    }
}

impl<T> PoolRegistry<T> {
    /// Reports whether a pool exists under `key`.
    #[must_use]
    pub fn has_pool(&self, key: &str) -> bool {
        self.pools.contains_key(key)
    }

    /// Bookkeeping counters of the pool under `key`.
    #[must_use]
    pub fn info(&self, key: &str) -> Option<PoolInfo> {
        self.pools.get(key).map(ResourcePool::info)
    }

    /// Borrows the pool registered under `key`.
    #[must_use]
    pub fn pool(&self, key: &str) -> Option<&ResourcePool<T>> {
        self.pools.get(key)
    }

    /// Key of the pool that minted the handle.
    #[must_use]
    pub fn key_of(&self, handle: Handle) -> Option<&str> {
        self.keys_by_id.get(&handle.pool()).map(String::as_str)
    }

    /// Borrows an acquired instance from whichever pool minted the handle.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let key = self.keys_by_id.get(&handle.pool())?;
        self.pools.get(key)?.get(handle)
    }

    /// Mutably borrows an acquired instance from whichever pool minted the handle.
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.owner_mut(handle)?.get_mut(handle)
    }

    /// Handles of every acquired instance across all pools.
    pub fn active_handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.pools.values().flat_map(|pool| pool.active_handles())
    }

    /// Iterates acquired instances across all pools.
    pub fn iter_active(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.pools.values().flat_map(|pool| pool.iter_active())
    }

    /// Mutably iterates acquired instances across all pools.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> + '_ {
        self.pools.values_mut().flat_map(|pool| pool.iter_active_mut())
    }

    /// Number of acquired instances across all pools.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.pools.values().map(ResourcePool::active_count).sum()
    }

    /// Clears and unregisters the pool under `key`.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(mut pool) = self.pools.remove(key) else {
            warn!("no pool named '{key}' to remove");
            return false;
        };
        let _ = self.keys_by_id.remove(&pool.id());
        pool.clear();
        true
    }

    fn owner_mut(&mut self, handle: Handle) -> Option<&mut ResourcePool<T>> {
        let key = self.keys_by_id.get(&handle.pool())?;
        self.pools.get_mut(key)
    }
}
