//! # ECS World
//!
//! The single coordination point for entities, components and systems.
//! Every mutation goes through here so that an entity's signature always
//! matches the components it holds and every system's matched set follows.
//!
//! ```text
//! add/remove component:  registry ─► entity signature ─► systems
//! destroy entity:        systems ─► registry cleanup ─► entity pool
//! ```

use super::component::Component;
use super::entity::{Entity, EntityPool};
use super::registry::ComponentRegistry;
use super::signature::Signature;
use super::system::{EntitySet, System, SystemRegistry};
use crate::config::WorldConfig;
use crate::error::EcsResult;

/// The ECS World - container for all entities, components and systems.
///
/// Entity capacity is fixed at creation. There is no internal locking;
/// wrap the world in a [`SharedWorld`](crate::SharedWorld) to share it
/// between threads.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::with_capacity(1_000)?;
/// world.register_component::<Position>()?;
///
/// let movers = world.component_signature::<Position>()?;
/// world.register_system::<Movers>()?;
/// world.set_system_signature::<Movers>(movers)?;
///
/// let entity = world.create_entity()?;
/// world.add_component(entity, Position { x: 1.0, y: 2.0 })?;
/// assert!(world.system_entities::<Movers>()?.contains(&entity));
/// ```
pub struct World {
    config: WorldConfig,
    entities: EntityPool,
    components: ComponentRegistry,
    systems: SystemRegistry,
}

impl World {
    /// Creates a new world from a validated configuration.
    ///
    /// All entity slots are allocated up front.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`](crate::EcsError::InvalidConfig)
    /// if the configuration is invalid.
    pub fn new(config: WorldConfig) -> EcsResult<Self> {
        config.validate()?;
        let entities = EntityPool::new(config.max_entities)?;
        tracing::debug!(max_entities = config.max_entities, "world created");

        Ok(Self {
            components: ComponentRegistry::new(config.max_entities),
            systems: SystemRegistry::new(),
            entities,
            config,
        })
    }

    /// Creates a new world holding at most `max_entities` live entities.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`](crate::EcsError::InvalidConfig)
    /// if `max_entities` is zero or exceeds the `u32` identifier space.
    pub fn with_capacity(max_entities: usize) -> EcsResult<Self> {
        Self::new(WorldConfig { max_entities })
    }

    /// Returns the configuration this world was built from.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns the maximum number of simultaneously alive entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.entities.alive_count()
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with an empty signature.
    ///
    /// Systems whose required signature is empty match the new entity
    /// right away.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExhausted`](crate::EcsError::CapacityExhausted)
    /// if every identifier is in use.
    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        let entity = self.entities.create()?;
        self.systems.on_entity_signature_changed(entity, Signature::EMPTY);
        tracing::trace!(%entity, "entity created");
        Ok(entity)
    }

    /// Destroys an entity: it leaves every system, loses every component,
    /// and its identifier goes back to the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if `entity` is not alive. Nothing is changed then.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.entities.ensure_alive(entity)?;

        self.systems.on_entity_destroyed(entity);
        self.components.entity_destroyed(entity);
        self.entities.destroy(entity)?;

        tracing::trace!(%entity, "entity destroyed");
        Ok(())
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Returns the signature of a live entity.
    ///
    /// # Errors
    ///
    /// Returns an error if `entity` is not alive.
    pub fn entity_signature(&self, entity: Entity) -> EcsResult<Signature> {
        self.entities.signature(entity)
    }

    /// Iterates over all alive entities in ascending order.
    pub fn iter_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_alive()
    }

    /// Returns every entity slot's signature as raw words, indexed by entity.
    ///
    /// Dead slots read as zero.
    #[must_use]
    pub fn signature_bits(&self) -> &[u64] {
        bytemuck::cast_slice(self.entities.signatures())
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Registers a component type and assigns it the next signature bit.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRegistered`, `NamespaceConflict` or
    /// `TooManyComponentTypes`.
    pub fn register_component<C: Component>(&mut self) -> EcsResult<Signature> {
        self.components.register::<C>()
    }

    /// Returns the signature bit of component type `C`.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `C` was never registered.
    pub fn component_signature<C: Component>(&self) -> EcsResult<Signature> {
        self.components.signature_of::<C>()
    }

    /// Adds the bit of `C` to `signature`.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `C` was never registered.
    pub fn add_component_signature<C: Component>(
        &self,
        signature: &mut Signature,
    ) -> EcsResult<()> {
        signature.union(self.components.signature_of::<C>()?);
        Ok(())
    }

    /// Removes the bit of `C` from `signature`.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `C` was never registered.
    pub fn remove_component_signature<C: Component>(
        &self,
        signature: &mut Signature,
    ) -> EcsResult<()> {
        signature.subtract(self.components.signature_of::<C>()?);
        Ok(())
    }

    /// Attaches `component` to `entity` and updates system membership.
    ///
    /// # Errors
    ///
    /// Returns an error if `entity` is not alive, `C` is not registered, or
    /// `entity` already holds a `C`. Nothing is changed then.
    pub fn add_component<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        self.entities.ensure_alive(entity)?;
        let bit = self.components.signature_of::<C>()?;
        self.components.add(entity, component)?;

        let signature = self.entities.signature_mut(entity)?;
        signature.union(bit);
        let signature = *signature;

        self.systems.on_entity_signature_changed(entity, signature);
        Ok(())
    }

    /// Detaches and returns the `C` of `entity` and updates system membership.
    ///
    /// # Errors
    ///
    /// Returns an error if `entity` is not alive, `C` is not registered, or
    /// `entity` holds no `C`. Nothing is changed then.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> EcsResult<C> {
        self.entities.ensure_alive(entity)?;
        let bit = self.components.signature_of::<C>()?;
        let component = self.components.remove::<C>(entity)?;

        let signature = self.entities.signature_mut(entity)?;
        signature.subtract(bit);
        let signature = *signature;

        self.systems.on_entity_signature_changed(entity, signature);
        Ok(component)
    }

    /// Gets the `C` held by `entity`.
    ///
    /// # Errors
    ///
    /// Returns an error if `entity` is not alive, `C` is not registered, or
    /// `entity` holds no `C`.
    pub fn get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.entities.ensure_alive(entity)?;
        self.components.get(entity)
    }

    /// Gets the `C` held by `entity` mutably.
    ///
    /// # Errors
    ///
    /// Returns an error if `entity` is not alive, `C` is not registered, or
    /// `entity` holds no `C`.
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.entities.ensure_alive(entity)?;
        self.components.get_mut(entity)
    }

    /// Returns `true` if the live `entity` holds a `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity) && self.components.contains::<C>(entity)
    }

    // =========================================================================
    // Singleton components
    // =========================================================================

    /// Registers `C` as a singleton component type.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRegistered` or `NamespaceConflict`.
    pub fn register_singleton_component<C: Component>(&mut self) -> EcsResult<()> {
        self.components.register_singleton::<C>()
    }

    /// Stores the single instance of `C`.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered`, or `DuplicateComponent` if an instance is
    /// already stored.
    pub fn add_singleton_component<C: Component>(&mut self, component: C) -> EcsResult<()> {
        self.components.add_singleton(component)
    }

    /// Removes and returns the single instance of `C`.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` or `MissingComponent`.
    pub fn remove_singleton_component<C: Component>(&mut self) -> EcsResult<C> {
        self.components.remove_singleton::<C>()
    }

    /// Gets the single instance of `C`.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` or `MissingComponent`.
    pub fn get_singleton_component<C: Component>(&self) -> EcsResult<&C> {
        self.components.get_singleton::<C>()
    }

    /// Gets the single instance of `C` mutably.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` or `MissingComponent`.
    pub fn get_singleton_component_mut<C: Component>(&mut self) -> EcsResult<&mut C> {
        self.components.get_singleton_mut::<C>()
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Constructs the single instance of `S` and returns it.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRegistered` on a repeat call.
    pub fn register_system<S: System + Default>(&mut self) -> EcsResult<&mut S> {
        self.systems.register::<S>()
    }

    /// Stores `system` as the single instance of `S` and returns it.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRegistered` if `S` is already registered.
    pub fn register_system_with<S: System>(&mut self, system: S) -> EcsResult<&mut S> {
        self.systems.register_with(system)
    }

    /// Replaces the required signature of `S`.
    ///
    /// Entities that already exist are not re-evaluated; they move in or
    /// out of the system on their next component change. Call
    /// [`World::rescan_system`] to re-evaluate them immediately.
    ///
    /// A freshly registered system requires the empty signature, so it
    /// matches every entity created before this call. Such entities stay
    /// matched, even without the new components, until they change or
    /// the system is rescanned.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `S` was never registered.
    pub fn set_system_signature<S: System>(&mut self, signature: Signature) -> EcsResult<()> {
        self.systems.set_signature::<S>(signature)
    }

    /// Returns the required signature of `S`.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `S` was never registered.
    pub fn system_signature<S: System>(&self) -> EcsResult<Signature> {
        self.systems.signature::<S>()
    }

    /// Returns the entities `S` currently matches.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `S` was never registered.
    pub fn system_entities<S: System>(&self) -> EcsResult<&EntitySet> {
        self.systems.entities::<S>()
    }

    /// Returns the live instance of `S`.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `S` was never registered.
    pub fn system<S: System>(&self) -> EcsResult<&S> {
        self.systems.get::<S>()
    }

    /// Returns the live instance of `S` mutably.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `S` was never registered.
    pub fn system_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        self.systems.get_mut::<S>()
    }

    /// Recomputes the matched set of `S` against every live entity.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `S` was never registered.
    pub fn rescan_system<S: System>(&mut self) -> EcsResult<()> {
        let signatures = self.entities.signatures();
        let alive = self
            .entities
            .iter_alive()
            .map(|entity| (entity, signatures[entity.index()]));
        self.systems.rescan::<S, _>(alive)
    }

    /// Runs [`System::update`] of `S` once over its matched entities.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `S` was never registered.
    pub fn run_system<S: System>(&mut self) -> EcsResult<()> {
        self.systems.run::<S>(&mut self.components)
    }

    /// Runs every system once, in registration order.
    pub fn run_systems(&mut self) {
        self.systems.run_all(&mut self.components);
    }
}
