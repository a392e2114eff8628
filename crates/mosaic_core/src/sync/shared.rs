//! # Shared World
//!
//! Single-writer / multiple-reader wrapper around a [`World`].

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ecs::World;

/// Shared read access to a world. Many may exist at once.
pub type WorldReadHandle<'a> = RwLockReadGuard<'a, World>;

/// Exclusive write access to a world.
pub type WorldWriteHandle<'a> = RwLockWriteGuard<'a, World>;

/// A world that can be cloned across threads.
///
/// Clones share the same world.
///
/// ## Usage
///
/// ```rust,ignore
/// let shared = SharedWorld::new(World::with_capacity(10_000)?);
///
/// // Logic thread
/// {
///     let mut world = shared.write();
///     let entity = world.create_entity()?;
///     world.add_component(entity, Position { x: 0.0, y: 0.0 })?;
/// }
///
/// // Render thread
/// let world = shared.read();
/// for &entity in world.system_entities::<RenderSystem>()? {
///     // draw...
/// }
/// ```
#[derive(Clone)]
pub struct SharedWorld {
    inner: Arc<RwLock<World>>,
}

impl SharedWorld {
    /// Wraps `world` for shared access.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            inner: Arc::new(RwLock::new(world)),
        }
    }

    /// Blocks until shared read access is available.
    #[must_use]
    pub fn read(&self) -> WorldReadHandle<'_> {
        self.inner.read()
    }

    /// Blocks until exclusive write access is available.
    #[must_use]
    pub fn write(&self) -> WorldWriteHandle<'_> {
        self.inner.write()
    }

    /// Returns read access if no writer holds the world.
    #[must_use]
    pub fn try_read(&self) -> Option<WorldReadHandle<'_>> {
        self.inner.try_read()
    }

    /// Returns write access if nobody else holds the world.
    #[must_use]
    pub fn try_write(&self) -> Option<WorldWriteHandle<'_>> {
        self.inner.try_write()
    }

    /// Runs `f` with exclusive access and returns its result.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Returns the number of clones sharing this world.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Takes the world back if this is the last clone.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged if other clones still exist.
    pub fn into_inner(self) -> Result<World, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_read_and_write_handles() {
        let shared = SharedWorld::new(World::with_capacity(8).unwrap());
        {
            let mut world = shared.write();
            world.register_component::<Counter>().unwrap();
            let e = world.create_entity().unwrap();
            world.add_component(e, Counter(1)).unwrap();
            assert!(shared.try_read().is_none());
        }

        let read1 = shared.read();
        let read2 = shared.read();
        assert_eq!(read1.alive_count(), 1);
        assert_eq!(read2.alive_count(), 1);
        assert!(shared.try_write().is_none());
    }

    #[test]
    fn test_writers_on_many_threads() {
        let shared = SharedWorld::new(World::with_capacity(64).unwrap());
        shared.with_mut(|world| world.register_component::<Counter>().unwrap());

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..8 {
                        shared.with_mut(|world| {
                            let e = world.create_entity().unwrap();
                            world.add_component(e, Counter(i)).unwrap();
                        });
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(shared.handle_count(), 1);
        let world = shared
            .into_inner()
            .unwrap_or_else(|_| panic!("clones outlived workers"));
        assert_eq!(world.alive_count(), 32);
        let total: u32 = world
            .iter_entities()
            .map(|e| world.get_component::<Counter>(e).unwrap().0)
            .sum();
        assert_eq!(total, 4 * (0..8).sum::<u32>());
    }
}
