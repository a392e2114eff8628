//! # Component Storage
//!
//! Pre-allocated, dense component storage.
//!
//! The storage uses a dense array strategy:
//! - One slot per entity identifier, allocated when the type is registered
//! - Add, remove and get are O(1) via entity index
//! - An entity holds at most one instance per type

use std::any::{type_name, Any};

use super::component::Component;
use super::entity::Entity;
use crate::error::{ComponentOwner, EcsError, EcsResult};

/// Pre-allocated storage for a single component type.
///
/// Slots are parallel to the entity pool's identifier space.
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Position> = ComponentStorage::new(5000);
/// storage.insert(entity, Position { x: 1.0, y: 2.0 })?;
/// ```
pub struct ComponentStorage<C: Component> {
    /// The dense array of component slots.
    slots: Box<[Option<C>]>,
    /// Number of occupied slots.
    len: usize,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates new component storage with one empty slot per entity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let slots = std::iter::repeat_with(|| None)
            .take(capacity)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self { slots, len: 0 }
    }

    /// Returns the capacity of this storage.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no entity holds this component.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `entity` holds this component.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        matches!(self.slots.get(entity.index()), Some(Some(_)))
    }

    /// Stores a component for `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateComponent`] if `entity` already holds one,
    /// or [`EcsError::EntityOutOfRange`] if `entity` has no slot.
    pub fn insert(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        let capacity = self.capacity();
        let slot = self
            .slots
            .get_mut(entity.index())
            .ok_or(EcsError::EntityOutOfRange { entity, capacity })?;

        if slot.is_some() {
            return Err(EcsError::DuplicateComponent {
                owner: ComponentOwner::Entity(entity),
                component: type_name::<C>(),
            });
        }

        *slot = Some(component);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the component of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`] if `entity` holds none.
    pub fn remove(&mut self, entity: Entity) -> EcsResult<C> {
        let component = self
            .slots
            .get_mut(entity.index())
            .and_then(Option::take)
            .ok_or_else(|| Self::missing(entity))?;

        self.len -= 1;
        Ok(component)
    }

    /// Gets the component of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`] if `entity` holds none.
    #[inline]
    pub fn get(&self, entity: Entity) -> EcsResult<&C> {
        self.slots
            .get(entity.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| Self::missing(entity))
    }

    /// Gets the component of `entity` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`] if `entity` holds none.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.slots
            .get_mut(entity.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| Self::missing(entity))
    }

    /// Iterates over all stored components with their entities.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.slots
            .iter()
            .zip(0u32..)
            .filter_map(|(slot, id)| slot.as_ref().map(|c| (Entity::from_raw(id), c)))
    }

    /// Drops every stored component.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.len = 0;
    }

    fn missing(entity: Entity) -> EcsError {
        EcsError::MissingComponent {
            owner: ComponentOwner::Entity(entity),
            component: type_name::<C>(),
        }
    }
}

/// Type-erased view of a [`ComponentStorage`], used by the registry to
/// clean up destroyed entities without knowing the component type.
pub(crate) trait ErasedStorage: Send + Sync {
    /// Drops the component of `entity`, if any.
    fn entity_destroyed(&mut self, entity: Entity);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStorage for ComponentStorage<C> {
    fn entity_destroyed(&mut self, entity: Entity) {
        if let Some(slot) = self.slots.get_mut(entity.index()) {
            if slot.take().is_some() {
                self.len -= 1;
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tag(u8);

    #[test]
    fn test_storage_creation() {
        let storage: ComponentStorage<Tag> = ComponentStorage::new(1000);
        assert_eq!(storage.capacity(), 1000);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_insert_get_remove() {
        let mut storage = ComponentStorage::new(100);
        let e = Entity::from_raw(50);

        storage.insert(e, Tag(7)).unwrap();
        assert!(storage.contains(e));
        assert_eq!(storage.get(e).unwrap().0, 7);

        storage.get_mut(e).unwrap().0 = 9;
        assert_eq!(storage.remove(e).unwrap(), Tag(9));
        assert!(!storage.contains(e));
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn test_duplicate_and_missing() {
        let mut storage = ComponentStorage::new(4);
        let e = Entity::from_raw(1);

        storage.insert(e, Tag(1)).unwrap();
        assert!(matches!(
            storage.insert(e, Tag(2)),
            Err(EcsError::DuplicateComponent { .. })
        ));
        // The first value survives the failed insert
        assert_eq!(storage.get(e).unwrap().0, 1);

        let other = Entity::from_raw(2);
        assert!(matches!(
            storage.get(other),
            Err(EcsError::MissingComponent { .. })
        ));
        assert!(matches!(
            storage.remove(other),
            Err(EcsError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_storage_bounds() {
        let mut storage = ComponentStorage::new(4);
        let outside = Entity::from_raw(4);
        assert_eq!(
            storage.insert(outside, Tag(0)),
            Err(EcsError::EntityOutOfRange {
                entity: outside,
                capacity: 4,
            })
        );
        assert!(storage.get(outside).is_err());
    }

    #[test]
    fn test_erased_cleanup_and_iter() {
        let mut storage = ComponentStorage::new(8);
        storage.insert(Entity::from_raw(2), Tag(2)).unwrap();
        storage.insert(Entity::from_raw(5), Tag(5)).unwrap();

        let erased: &mut dyn ErasedStorage = &mut storage;
        erased.entity_destroyed(Entity::from_raw(2));
        erased.entity_destroyed(Entity::from_raw(3));
        erased.entity_destroyed(Entity::from_raw(100));
        assert_eq!(storage.len(), 1);
        assert!(!storage.contains(Entity::from_raw(2)));

        let remaining: Vec<(u32, u8)> = storage
            .iter()
            .map(|(e, t)| (e.id(), t.0))
            .collect();
        assert_eq!(remaining, vec![(5, 5)]);

        storage.clear();
        assert!(storage.is_empty());
    }
}
