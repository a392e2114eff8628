//! # Component Registry
//!
//! Owns one [`ComponentStorage`] per registered component type and one
//! optional cell per singleton type.
//!
//! Bits are handed out in registration order and are never reused, so a
//! world can know at most [`MAX_COMPONENT_TYPES`] component types.
//! Singleton types live in their own namespace and have no bit.

use std::any::Any;
use std::collections::HashMap;

use super::component::{Component, TypeKey};
use super::entity::Entity;
use super::signature::{Signature, MAX_COMPONENT_TYPES};
use super::storage::{ComponentStorage, ErasedStorage};
use crate::error::{ComponentOwner, EcsError, EcsResult};

/// A registered component type: its bit and its store.
struct ComponentEntry {
    signature: Signature,
    storage: Box<dyn ErasedStorage>,
}

/// Routes typed component calls to the matching store.
pub struct ComponentRegistry {
    /// Slots per store; equal to the entity pool capacity.
    capacity: usize,
    /// Stores keyed by component type.
    components: HashMap<TypeKey, ComponentEntry>,
    /// Singleton cells keyed by type. `None` until a value is added.
    singletons: HashMap<TypeKey, Option<Box<dyn Any + Send + Sync>>>,
    /// Next unassigned signature bit.
    next_bit: usize,
}

impl ComponentRegistry {
    /// Creates an empty registry whose stores hold `capacity` entities.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            components: HashMap::new(),
            singletons: HashMap::new(),
            next_bit: 0,
        }
    }

    /// Number of registered (non-singleton) component types.
    #[inline]
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if `C` is registered as a per-entity component.
    #[inline]
    #[must_use]
    pub fn is_registered<C: Component>(&self) -> bool {
        self.components.contains_key(&TypeKey::of::<C>())
    }

    /// Returns `true` if `C` is registered as a singleton component.
    #[inline]
    #[must_use]
    pub fn is_singleton_registered<C: Component>(&self) -> bool {
        self.singletons.contains_key(&TypeKey::of::<C>())
    }

    /// Registers `C`, assigning it the next free signature bit.
    ///
    /// # Errors
    ///
    /// - [`EcsError::AlreadyRegistered`] if `C` is already a component type
    /// - [`EcsError::NamespaceConflict`] if `C` is a singleton type
    /// - [`EcsError::TooManyComponentTypes`] if all 64 bits are taken
    pub fn register<C: Component>(&mut self) -> EcsResult<Signature> {
        let key = TypeKey::of::<C>();
        if self.components.contains_key(&key) {
            return Err(EcsError::AlreadyRegistered(key.name()));
        }
        if self.singletons.contains_key(&key) {
            return Err(EcsError::NamespaceConflict(key.name()));
        }
        if self.next_bit >= MAX_COMPONENT_TYPES {
            tracing::warn!(component = key.name(), "signature bit space exhausted");
            return Err(EcsError::TooManyComponentTypes);
        }

        let signature = Signature::with_bit(self.next_bit)?;
        self.components.insert(
            key,
            ComponentEntry {
                signature,
                storage: Box::new(ComponentStorage::<C>::new(self.capacity)),
            },
        );
        tracing::debug!(
            component = key.name(),
            bit = self.next_bit,
            "registered component"
        );
        self.next_bit += 1;

        Ok(signature)
    }

    /// Returns the signature bit assigned to `C`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] if `C` was never registered.
    pub fn signature_of<C: Component>(&self) -> EcsResult<Signature> {
        self.entry::<C>().map(|entry| entry.signature)
    }

    /// Stores `component` for `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::DuplicateComponent`].
    pub fn add<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        self.storage_mut::<C>()?.insert(entity, component)
    }

    /// Removes and returns the `C` held by `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    pub fn remove<C: Component>(&mut self, entity: Entity) -> EcsResult<C> {
        self.storage_mut::<C>()?.remove(entity)
    }

    /// Gets the `C` held by `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    pub fn get<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.storage::<C>()?.get(entity)
    }

    /// Gets the `C` held by `entity` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.storage_mut::<C>()?.get_mut(entity)
    }

    /// Returns `true` if `entity` holds a `C`. Unregistered types hold nothing.
    #[must_use]
    pub fn contains<C: Component>(&self, entity: Entity) -> bool {
        self.storage::<C>()
            .map(|storage| storage.contains(entity))
            .unwrap_or(false)
    }

    /// Returns the typed store for `C`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] if `C` was never registered.
    pub fn storage<C: Component>(&self) -> EcsResult<&ComponentStorage<C>> {
        self.entry::<C>()?
            .storage
            .as_any()
            .downcast_ref::<ComponentStorage<C>>()
            .ok_or(EcsError::NotRegistered(TypeKey::of::<C>().name()))
    }

    /// Returns the typed store for `C` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] if `C` was never registered.
    pub fn storage_mut<C: Component>(&mut self) -> EcsResult<&mut ComponentStorage<C>> {
        let key = TypeKey::of::<C>();
        self.components
            .get_mut(&key)
            .and_then(|entry| {
                entry
                    .storage
                    .as_any_mut()
                    .downcast_mut::<ComponentStorage<C>>()
            })
            .ok_or(EcsError::NotRegistered(key.name()))
    }

    /// Drops every component `entity` holds, in every store.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for entry in self.components.values_mut() {
            entry.storage.entity_destroyed(entity);
        }
    }

    // =========================================================================
    // Singleton components
    // =========================================================================

    /// Registers `C` as a singleton type with an empty cell.
    ///
    /// # Errors
    ///
    /// - [`EcsError::AlreadyRegistered`] if `C` is already a singleton type
    /// - [`EcsError::NamespaceConflict`] if `C` is a component type
    pub fn register_singleton<C: Component>(&mut self) -> EcsResult<()> {
        let key = TypeKey::of::<C>();
        if self.singletons.contains_key(&key) {
            return Err(EcsError::AlreadyRegistered(key.name()));
        }
        if self.components.contains_key(&key) {
            return Err(EcsError::NamespaceConflict(key.name()));
        }

        self.singletons.insert(key, None);
        tracing::debug!(component = key.name(), "registered singleton component");
        Ok(())
    }

    /// Fills the singleton cell of `C`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::DuplicateComponent`]
    /// if the cell is already filled.
    pub fn add_singleton<C: Component>(&mut self, component: C) -> EcsResult<()> {
        let key = TypeKey::of::<C>();
        let cell = self
            .singletons
            .get_mut(&key)
            .ok_or(EcsError::NotRegistered(key.name()))?;

        if cell.is_some() {
            return Err(EcsError::DuplicateComponent {
                owner: ComponentOwner::Singleton,
                component: key.name(),
            });
        }

        *cell = Some(Box::new(component));
        Ok(())
    }

    /// Empties the singleton cell of `C`, returning its value.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    pub fn remove_singleton<C: Component>(&mut self) -> EcsResult<C> {
        let key = TypeKey::of::<C>();
        let cell = self
            .singletons
            .get_mut(&key)
            .ok_or(EcsError::NotRegistered(key.name()))?;

        let boxed = cell.take().ok_or(EcsError::MissingComponent {
            owner: ComponentOwner::Singleton,
            component: key.name(),
        })?;

        match boxed.downcast::<C>() {
            Ok(component) => Ok(*component),
            Err(other) => {
                // Cells are keyed by TypeId, so this branch is unreachable;
                // put the value back rather than lose it.
                *cell = Some(other);
                Err(EcsError::NotRegistered(key.name()))
            }
        }
    }

    /// Gets the singleton value of `C`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    pub fn get_singleton<C: Component>(&self) -> EcsResult<&C> {
        let key = TypeKey::of::<C>();
        self.singletons
            .get(&key)
            .ok_or(EcsError::NotRegistered(key.name()))?
            .as_ref()
            .and_then(|boxed| boxed.downcast_ref::<C>())
            .ok_or(EcsError::MissingComponent {
                owner: ComponentOwner::Singleton,
                component: key.name(),
            })
    }

    /// Gets the singleton value of `C` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    pub fn get_singleton_mut<C: Component>(&mut self) -> EcsResult<&mut C> {
        let key = TypeKey::of::<C>();
        self.singletons
            .get_mut(&key)
            .ok_or(EcsError::NotRegistered(key.name()))?
            .as_mut()
            .and_then(|boxed| boxed.downcast_mut::<C>())
            .ok_or(EcsError::MissingComponent {
                owner: ComponentOwner::Singleton,
                component: key.name(),
            })
    }

    fn entry<C: Component>(&self) -> EcsResult<&ComponentEntry> {
        let key = TypeKey::of::<C>();
        self.components
            .get(&key)
            .ok_or(EcsError::NotRegistered(key.name()))
    }
}
