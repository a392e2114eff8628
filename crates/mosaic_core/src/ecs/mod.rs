//! # Entity Component System
//!
//! Bookkeeping for entities, components and systems.
//!
//! ## Design Philosophy
//!
//! - Entity slots and component stores are sized once, at world creation
//! - Each component type owns one bit of a 64-bit [`Signature`]
//! - A system matches every entity whose signature contains its own
//! - Matched sets are updated per entity, as components come and go

mod component;
mod entity;
mod registry;
mod signature;
mod storage;
mod system;
mod world;

pub use component::Component;
pub use entity::{Entity, EntityPool};
pub use registry::ComponentRegistry;
pub use signature::{Signature, MAX_COMPONENT_TYPES};
pub use storage::ComponentStorage;
pub use system::{Components, EntitySet, System, SystemRegistry};
pub use world::World;
