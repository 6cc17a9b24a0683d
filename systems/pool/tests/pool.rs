use horde_core::{PoolId, Vec2};
use horde_system_pool::{Placeable, PoolError, PoolRegistry, Poolable, ResourcePool};

#[derive(Clone, Debug, Default)]
struct Token {
    acquired: u32,
    released: u32,
    position: Vec2,
    rotation: f32,
}

impl Poolable for Token {
    fn on_acquire(&mut self) {
        self.acquired += 1;
    }

    fn on_release(&mut self) {
        self.released += 1;
    }
}

impl Placeable for Token {
    fn place(&mut self, position: Vec2, rotation: f32) {
        self.position = position;
        self.rotation = rotation;
    }
}

fn pool(initial: usize, auto_grow: bool, increment: usize) -> ResourcePool<Token> {
    ResourcePool::new(
        PoolId::new(7),
        "tokens",
        Token::default(),
        initial,
        auto_grow,
        increment,
    )
}

fn assert_conserved(pool: &ResourcePool<Token>) {
    let info = pool.info();
    assert_eq!(info.idle + info.active, info.total, "{info:?}");
}

#[test]
fn counts_are_conserved_across_mixed_operations() {
    let mut pool = pool(4, true, 2);
    assert_conserved(&pool);

    let mut held = Vec::new();
    for round in 0..6 {
        if let Some(handle) = pool.acquire() {
            held.push(handle);
        }
        assert_conserved(&pool);
        if round % 2 == 1 {
            let handle = held.remove(0);
            assert!(pool.release(handle));
            assert_conserved(&pool);
        }
    }

    assert_eq!(pool.active_count(), held.len());
    assert_eq!(pool.release_all(), held.len());
    assert_eq!(pool.active_count(), 0);
    assert_conserved(&pool);
}

#[test]
fn second_release_is_ignored() {
    let mut pool = pool(2, false, 1);
    let handle = pool.acquire().expect("idle instance available");

    assert!(pool.release(handle));
    let idle = pool.idle_count();

    assert!(!pool.release(handle));
    assert_eq!(pool.idle_count(), idle);
    assert_conserved(&pool);
}

#[test]
fn running_dry_grows_once_by_the_increment() {
    let mut pool = pool(2, true, 3);

    let handles: Vec<_> = (0..5).filter_map(|_| pool.acquire()).collect();

    assert_eq!(handles.len(), 5);
    assert_eq!(pool.expansions(), 1);
    assert_eq!(pool.total_count(), 5);
    assert_eq!(pool.idle_count(), 0);
    assert_eq!(handles[0].slot(), 0);
    assert_eq!(handles[1].slot(), 1);
}

#[test]
fn exhausted_pool_without_growth_returns_none() {
    let mut pool = pool(1, false, 4);

    assert!(pool.acquire().is_some());
    assert!(pool.acquire().is_none());
    assert_eq!(pool.total_count(), 1);
    assert_eq!(pool.expansions(), 0);
}

#[test]
fn hooks_run_on_acquire_and_release() {
    let mut pool = pool(1, false, 1);

    let handle = pool.acquire().expect("idle instance available");
    assert_eq!(pool.get(handle).map(|token| token.acquired), Some(1));

    assert!(pool.release(handle));
    assert!(pool.get(handle).is_none(), "released handles stop resolving");

    let again = pool.acquire().expect("instance was returned");
    assert_eq!(again, handle);
    let token = pool.get(again).expect("reacquired instance resolves");
    assert_eq!(token.acquired, 2);
    assert_eq!(token.released, 1);
}

#[test]
fn acquire_at_places_the_instance() {
    let mut pool = pool(1, false, 1);

    let handle = pool
        .acquire_at(Vec2::new(3.0, -4.0), 1.5)
        .expect("idle instance available");

    let token = pool.get(handle).expect("instance resolves");
    assert_eq!(token.position, Vec2::new(3.0, -4.0));
    assert_eq!(token.rotation, 1.5);
}

#[test]
fn cleared_pool_refuses_further_use() {
    let mut pool = pool(3, true, 1);
    let handle = pool.acquire().expect("idle instance available");

    pool.clear();

    assert!(pool.is_retired());
    assert_eq!(pool.total_count(), 0);
    assert!(pool.get(handle).is_none());
    assert!(!pool.release(handle));
    assert!(pool.acquire().is_none());
}

#[test]
fn registry_refuses_empty_and_duplicate_keys() {
    let mut registry = PoolRegistry::new();

    assert_eq!(
        registry.create_pool("", Token::default(), 1, false, 1),
        Err(PoolError::EmptyKey)
    );
    assert!(registry
        .create_pool("bats", Token::default(), 2, false, 1)
        .is_ok());
    assert_eq!(
        registry.create_pool("bats", Token::default(), 9, false, 1),
        Err(PoolError::DuplicateKey("bats".to_owned()))
    );

    let info = registry.info("bats").expect("pool registered");
    assert_eq!(info.total, 2, "duplicate create left the original untouched");
    assert!(!registry.has_pool(""));
}

#[test]
fn registry_rejects_handles_minted_by_another_pool() {
    let mut registry = PoolRegistry::new();
    let _ = registry
        .create_pool("bats", Token::default(), 1, false, 1)
        .expect("pool created");
    let _ = registry
        .create_pool("slimes", Token::default(), 1, false, 1)
        .expect("pool created");

    let bat = registry.acquire("bats").expect("bat available");

    assert!(!registry.release("slimes", bat));
    assert_eq!(registry.info("bats").map(|info| info.active), Some(1));
    assert_eq!(registry.key_of(bat), Some("bats"));
    assert!(registry.release_handle(bat));
    assert_eq!(registry.active_count(), 0);
}

#[test]
fn handles_from_a_removed_pool_never_resolve_again() {
    let mut registry = PoolRegistry::new();
    let first = registry
        .create_pool("bats", Token::default(), 1, false, 1)
        .expect("pool created");
    let stale = registry.acquire("bats").expect("bat available");

    assert!(registry.remove("bats"));
    assert!(!registry.has_pool("bats"));

    let second = registry
        .create_pool("bats", Token::default(), 1, false, 1)
        .expect("pool recreated");
    assert_ne!(first, second);

    let fresh = registry.acquire("bats").expect("bat available");
    assert_eq!(fresh.slot(), stale.slot());
    assert!(registry.get(stale).is_none());
    assert!(registry.get(fresh).is_some());
    assert!(!registry.release_handle(stale));
}

#[test]
fn registry_prewarm_and_release_all() {
    let mut registry = PoolRegistry::new();
    let _ = registry
        .create_pool("bats", Token::default(), 1, false, 1)
        .expect("pool created");

    assert_eq!(
        registry.prewarm("ghosts", 4),
        Err(PoolError::UnknownPool("ghosts".to_owned()))
    );
    assert_eq!(registry.prewarm("bats", 2), Ok(()));
    assert_eq!(registry.info("bats").map(|info| info.total), Some(3));

    let acquired: Vec<_> = (0..3).filter_map(|_| registry.acquire("bats")).collect();
    assert_eq!(acquired.len(), 3);
    assert_eq!(registry.active_handles().count(), 3);

    assert_eq!(registry.release_all(), 3);
    assert_eq!(registry.active_count(), 0);
    assert!(registry.acquire("ghosts").is_none());
}
