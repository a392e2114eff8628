//! # MOSAIC Core
//!
//! Entity Component System runtime built around signature matching:
//! - Entities are plain identifiers from a fixed-capacity pool
//! - Components are stored per type, at most one per entity
//! - Systems observe the live set of entities carrying their components
//!
//! ## Architecture Rules
//!
//! 1. **One facade** - every mutation goes through [`World`]
//! 2. **Signatures never lag** - an entity's signature always names exactly
//!    the components it holds, and system membership follows each change
//! 3. **Contract violations are errors** - every misuse returns an
//!    [`EcsError`] and leaves the world unchanged
//!
//! ## Example
//!
//! ```rust,ignore
//! use mosaic_core::{System, World};
//!
//! #[derive(Default)]
//! struct Movers;
//! impl System for Movers {}
//!
//! let mut world = World::with_capacity(5_000)?;
//! let position = world.register_component::<Position>()?;
//! world.register_system::<Movers>()?;
//! world.set_system_signature::<Movers>(position)?;
//!
//! let entity = world.create_entity()?;
//! world.add_component(entity, Position { x: 0.0, y: 0.0 })?;
//! assert_eq!(world.system_entities::<Movers>()?.len(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod sync;

pub use config::{WorldConfig, DEFAULT_MAX_ENTITIES};
pub use ecs::{
    Component, ComponentRegistry, ComponentStorage, Components, Entity, EntityPool, EntitySet,
    Signature, System, SystemRegistry, World, MAX_COMPONENT_TYPES,
};
pub use error::{ComponentOwner, EcsError, EcsResult};
pub use sync::{SharedWorld, WorldReadHandle, WorldWriteHandle};
