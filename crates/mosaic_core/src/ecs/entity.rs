//! # Entity Management
//!
//! Entities are plain indices into component stores. The [`EntityPool`]
//! hands them out and takes them back:
//! - Pre-populated with every identifier in ascending order
//! - Reuse is FIFO, so the oldest destroyed identifier comes back first
//! - Each slot carries the entity's current [`Signature`]

use std::collections::VecDeque;
use std::fmt;

use bytemuck::{Pod, Zeroable};

use super::signature::Signature;
use crate::error::{EcsError, EcsResult};

/// Unique identifier for a live entity.
///
/// An entity is only a key into component stores; it carries no payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Creates an entity handle from a raw index.
    ///
    /// The handle is only meaningful to the world whose pool issued it.
    #[inline]
    #[must_use]
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index of this entity in component arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw identifier.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fixed-capacity allocator of entity identifiers.
///
/// All memory is allocated at construction. Creating and destroying
/// entities never grows the pool.
pub struct EntityPool {
    /// Identifiers not currently in use, oldest-freed first.
    available: VecDeque<Entity>,
    /// Per-slot signature, indexed by entity.
    signatures: Box<[Signature]>,
    /// Per-slot liveness flag.
    alive: Box<[bool]>,
    /// Number of currently alive entities.
    alive_count: usize,
}

impl EntityPool {
    /// Creates a pool holding every identifier in `0..capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `capacity` is zero or does not
    /// fit in a `u32`.
    pub fn new(capacity: usize) -> EcsResult<Self> {
        if capacity == 0 {
            return Err(EcsError::InvalidConfig(
                "entity capacity must be greater than zero".to_owned(),
            ));
        }
        let Ok(last) = u32::try_from(capacity - 1) else {
            return Err(EcsError::InvalidConfig(format!(
                "entity capacity {capacity} exceeds u32 identifier space"
            )));
        };

        Ok(Self {
            available: (0..=last).map(Entity).collect(),
            signatures: vec![Signature::EMPTY; capacity].into_boxed_slice(),
            alive: vec![false; capacity].into_boxed_slice(),
            alive_count: 0,
        })
    }

    /// Returns the maximum number of simultaneously alive entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.alive.len()
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Returns the number of identifiers that can still be handed out.
    #[inline]
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Takes the next unused identifier out of the pool.
    ///
    /// The new entity starts with an empty signature.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExhausted`] if every identifier is alive.
    pub fn create(&mut self) -> EcsResult<Entity> {
        let Some(entity) = self.available.pop_front() else {
            tracing::warn!(capacity = self.capacity(), "entity pool exhausted");
            return Err(EcsError::CapacityExhausted {
                capacity: self.capacity(),
            });
        };

        let idx = entity.index();
        self.alive[idx] = true;
        self.signatures[idx] = Signature::EMPTY;
        self.alive_count += 1;

        Ok(entity)
    }

    /// Returns an identifier to the pool and resets its signature.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityOutOfRange`] or [`EcsError::EntityNotAlive`]
    /// if `entity` is not a live identifier of this pool.
    pub fn destroy(&mut self, entity: Entity) -> EcsResult<()> {
        self.ensure_alive(entity)?;

        let idx = entity.index();
        self.alive[idx] = false;
        self.signatures[idx].reset();
        self.alive_count -= 1;
        self.available.push_back(entity);

        Ok(())
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Fails unless `entity` is a live identifier of this pool.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityOutOfRange`] or [`EcsError::EntityNotAlive`].
    pub fn ensure_alive(&self, entity: Entity) -> EcsResult<()> {
        match self.alive.get(entity.index()) {
            Some(true) => Ok(()),
            Some(false) => Err(EcsError::EntityNotAlive(entity)),
            None => Err(EcsError::EntityOutOfRange {
                entity,
                capacity: self.capacity(),
            }),
        }
    }

    /// Returns the current signature of a live entity.
    ///
    /// # Errors
    ///
    /// Returns an error if `entity` is not alive.
    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        self.ensure_alive(entity)?;
        Ok(self.signatures[entity.index()])
    }

    /// Returns a mutable reference to a live entity's signature.
    ///
    /// # Errors
    ///
    /// Returns an error if `entity` is not alive.
    pub fn signature_mut(&mut self, entity: Entity) -> EcsResult<&mut Signature> {
        self.ensure_alive(entity)?;
        Ok(&mut self.signatures[entity.index()])
    }

    /// Returns every slot's signature. Dead slots are always empty.
    #[inline]
    #[must_use]
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Iterates over all alive entities in ascending order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .zip(0u32..)
            .filter_map(|(&alive, id)| alive.then_some(Entity(id)))
    }
}

impl fmt::Debug for EntityPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityPool")
            .field("capacity", &self.capacity())
            .field("alive_count", &self.alive_count)
            .finish_non_exhaustive()
    }
}
