//! # System Registry
//!
//! Systems are user types that want to know which entities carry a given
//! set of components. The registry stores one instance per system type and,
//! next to it, the required [`Signature`] and the live matched-entity set.
//!
//! Membership is only ever recomputed per entity, when that entity's
//! signature changes or the entity is destroyed. Replacing a system's
//! signature does not rescan existing entities; call
//! [`SystemRegistry::rescan`] for that.

use std::any::Any;
use std::collections::{BTreeSet, HashMap};

use super::component::{Component, TypeKey};
use super::entity::Entity;
use super::registry::ComponentRegistry;
use super::signature::Signature;
use crate::error::{EcsError, EcsResult};

/// The set of entities a system currently matches, in ascending order.
pub type EntitySet = BTreeSet<Entity>;

/// A processing unit that observes every entity whose signature is a
/// superset of its own.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Movers;
///
/// impl System for Movers {
///     fn update(&mut self, entities: &EntitySet, components: &mut Components<'_>) {
///         for &entity in entities {
///             let velocity = *components.get::<Velocity>(entity).unwrap();
///             components.get_mut::<Position>(entity).unwrap().x += velocity.dx;
///         }
///     }
/// }
/// ```
pub trait System: Send + Sync + 'static {
    /// Processes the matched entities. Does nothing unless overridden.
    fn update(&mut self, _entities: &EntitySet, _components: &mut Components<'_>) {}
}

/// Component access handed to [`System::update`].
///
/// Values can be read and changed, but components cannot be added or
/// removed, so no signature changes while a system runs.
pub struct Components<'w> {
    registry: &'w mut ComponentRegistry,
}

impl<'w> Components<'w> {
    pub(crate) fn new(registry: &'w mut ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Gets the `C` held by `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    #[inline]
    pub fn get<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.registry.get(entity)
    }

    /// Gets the `C` held by `entity` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    #[inline]
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.registry.get_mut(entity)
    }

    /// Returns `true` if `entity` holds a `C`.
    #[inline]
    #[must_use]
    pub fn contains<C: Component>(&self, entity: Entity) -> bool {
        self.registry.contains::<C>(entity)
    }

    /// Gets the singleton value of `C`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    #[inline]
    pub fn singleton<C: Component>(&self) -> EcsResult<&C> {
        self.registry.get_singleton()
    }

    /// Gets the singleton value of `C` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] or [`EcsError::MissingComponent`].
    #[inline]
    pub fn singleton_mut<C: Component>(&mut self) -> EcsResult<&mut C> {
        self.registry.get_singleton_mut()
    }
}

/// Object-safe wrapper so systems of different types share one table.
trait ErasedSystem: Send + Sync {
    fn update(&mut self, entities: &EntitySet, components: &mut Components<'_>);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: System> ErasedSystem for S {
    fn update(&mut self, entities: &EntitySet, components: &mut Components<'_>) {
        System::update(self, entities, components);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A registered system and its bookkeeping.
struct SystemSlot {
    key: TypeKey,
    signature: Signature,
    entities: EntitySet,
    instance: Box<dyn ErasedSystem>,
}

impl SystemSlot {
    fn refresh(&mut self, entity: Entity, entity_signature: Signature) {
        if entity_signature.contains(self.signature) {
            if self.entities.insert(entity) {
                tracing::trace!(system = self.key.name(), %entity, "entity matched");
            }
        } else if self.entities.remove(&entity) {
            tracing::trace!(system = self.key.name(), %entity, "entity unmatched");
        }
    }
}

/// Owns every registered system in registration order.
#[derive(Default)]
pub struct SystemRegistry {
    slots: Vec<SystemSlot>,
    index: HashMap<TypeKey, usize>,
}

impl SystemRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no system is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` if `S` is registered.
    #[inline]
    #[must_use]
    pub fn is_registered<S: System>(&self) -> bool {
        self.index.contains_key(&TypeKey::of::<S>())
    }

    /// Constructs and stores the single instance of `S`.
    ///
    /// The system starts with an empty signature and no entities.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AlreadyRegistered`] on a repeat call for `S`.
    pub fn register<S: System + Default>(&mut self) -> EcsResult<&mut S> {
        self.register_with(S::default())
    }

    /// Stores `system` as the single instance of `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AlreadyRegistered`] if `S` is already registered.
    pub fn register_with<S: System>(&mut self, system: S) -> EcsResult<&mut S> {
        let key = TypeKey::of::<S>();
        if self.index.contains_key(&key) {
            return Err(EcsError::AlreadyRegistered(key.name()));
        }

        self.index.insert(key, self.slots.len());
        self.slots.push(SystemSlot {
            key,
            signature: Signature::EMPTY,
            entities: EntitySet::new(),
            instance: Box::new(system),
        });
        tracing::debug!(system = key.name(), "registered system");

        self.get_mut::<S>()
    }

    /// Replaces the required signature of `S`.
    ///
    /// Existing entities are not rescanned: the matched set only changes
    /// when an entity's signature changes or [`SystemRegistry::rescan`] runs.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] if `S` was never registered.
    pub fn set_signature<S: System>(&mut self, signature: Signature) -> EcsResult<()> {
        let slot = self.slot_mut::<S>()?;
        slot.signature = signature;
        tracing::debug!(
            system = slot.key.name(),
            %signature,
            "system signature replaced"
        );
        Ok(())
    }

    /// Returns the required signature of `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] if `S` was never registered.
    pub fn signature<S: System>(&self) -> EcsResult<Signature> {
        self.slot::<S>().map(|slot| slot.signature)
    }

    /// Returns the entities `S` currently matches.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] if `S` was never registered.
    pub fn entities<S: System>(&self) -> EcsResult<&EntitySet> {
        self.slot::<S>().map(|slot| &slot.entities)
    }

    /// Returns the live instance of `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] if `S` was never registered.
    pub fn get<S: System>(&self) -> EcsResult<&S> {
        self.slot::<S>()?
            .instance
            .as_any()
            .downcast_ref::<S>()
            .ok_or(EcsError::NotRegistered(TypeKey::of::<S>().name()))
    }

    /// Returns the live instance of `S` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] if `S` was never registered.
    pub fn get_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        self.slot_mut::<S>()?
            .instance
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or(EcsError::NotRegistered(TypeKey::of::<S>().name()))
    }

    /// Re-evaluates every system's membership for `entity`.
    ///
    /// Called after any component add or remove on `entity`.
    pub fn on_entity_signature_changed(&mut self, entity: Entity, signature: Signature) {
        for slot in &mut self.slots {
            slot.refresh(entity, signature);
        }
    }

    /// Removes `entity` from every system.
    pub fn on_entity_destroyed(&mut self, entity: Entity) {
        for slot in &mut self.slots {
            slot.entities.remove(&entity);
        }
    }

    /// Recomputes the matched set of `S` from scratch.
    ///
    /// `alive` must yield every live entity with its current signature.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotRegistered`] if `S` was never registered.
    pub fn rescan<S, I>(&mut self, alive: I) -> EcsResult<()>
    where
        S: System,
        I: IntoIterator<Item = (Entity, Signature)>,
    {
        let slot = self.slot_mut::<S>()?;
        let required = slot.signature;
        slot.entities = alive
            .into_iter()
            .filter(|(_, signature)| signature.contains(required))
            .map(|(entity, _)| entity)
            .collect();
        tracing::debug!(
            system = slot.key.name(),
            matched = slot.entities.len(),
            "system rescanned"
        );
        Ok(())
    }

    /// Runs [`System::update`] of `S` over its matched entities.
    pub(crate) fn run<S: System>(&mut self, components: &mut ComponentRegistry) -> EcsResult<()> {
        let slot = self.slot_mut::<S>()?;
        slot.instance
            .update(&slot.entities, &mut Components::new(components));
        Ok(())
    }

    /// Runs every system once, in registration order.
    pub(crate) fn run_all(&mut self, components: &mut ComponentRegistry) {
        for slot in &mut self.slots {
            slot.instance
                .update(&slot.entities, &mut Components::new(components));
        }
    }

    fn slot<S: System>(&self) -> EcsResult<&SystemSlot> {
        let key = TypeKey::of::<S>();
        self.index
            .get(&key)
            .and_then(|&i| self.slots.get(i))
            .ok_or(EcsError::NotRegistered(key.name()))
    }

    fn slot_mut<S: System>(&mut self) -> EcsResult<&mut SystemSlot> {
        let key = TypeKey::of::<S>();
        self.index
            .get(&key)
            .and_then(|&i| self.slots.get_mut(i))
            .ok_or(EcsError::NotRegistered(key.name()))
    }
}
