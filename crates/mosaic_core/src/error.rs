//! # ECS Error Types
//!
//! Every failure the runtime can report. All of them are contract
//! violations by the embedding application; none are retried internally
//! and every operation that returns one has left the world untouched.

use std::fmt;

use thiserror::Error;

use crate::ecs::Entity;

/// The holder a component operation was aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentOwner {
    /// A per-entity component store.
    Entity(Entity),
    /// The world-wide singleton cell of a type.
    Singleton,
}

impl fmt::Display for ComponentOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(entity) => write!(f, "entity {entity}"),
            Self::Singleton => f.write_str("singleton cell"),
        }
    }
}

/// Errors that can occur in the ECS runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity pool has no free identifiers left.
    #[error("entity pool exhausted: all {capacity} entities are alive")]
    CapacityExhausted {
        /// Configured maximum number of entities.
        capacity: usize,
    },

    /// All 64 signature bits are already assigned to component types.
    #[error("too many component types: the signature bit space is exhausted")]
    TooManyComponentTypes,

    /// The component, singleton or system type was registered before.
    #[error("type already registered: {0}")]
    AlreadyRegistered(&'static str),

    /// The component, singleton or system type was never registered.
    #[error("type not registered: {0}")]
    NotRegistered(&'static str),

    /// The entity (or singleton cell) already holds an instance of the component.
    #[error("{owner} already has component {component}")]
    DuplicateComponent {
        /// Where the component was being stored.
        owner: ComponentOwner,
        /// Name of the component type.
        component: &'static str,
    },

    /// The entity (or singleton cell) holds no instance of the component.
    #[error("{owner} has no component {component}")]
    MissingComponent {
        /// Where the component was being looked up.
        owner: ComponentOwner,
        /// Name of the component type.
        component: &'static str,
    },

    /// A type was registered both as a regular and as a singleton component.
    #[error("type {0} is already registered in the other component namespace")]
    NamespaceConflict(&'static str),

    /// The entity is not currently alive.
    #[error("entity {0} is not alive")]
    EntityNotAlive(Entity),

    /// The entity identifier lies outside the pool's identifier space.
    #[error("entity {entity} is out of range for capacity {capacity}")]
    EntityOutOfRange {
        /// The offending entity.
        entity: Entity,
        /// Configured maximum number of entities.
        capacity: usize,
    },

    /// A signature bit index of 64 or more was used.
    #[error("signature bit {0} is out of range")]
    InvalidSignatureBit(usize),

    /// Invalid world configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
