//! # Component Types
//!
//! Components are pure data containers with no behavior. The runtime never
//! looks inside them; a component type is identified by its `TypeId`.

use std::any::{type_name, TypeId};

/// Marker trait for ECS components and singleton components.
///
/// Implemented for every `Send + Sync + 'static` type, so plain structs can be
/// registered directly:
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// world.register_component::<Position>()?;
/// ```
pub trait Component: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Component for T {}

/// Key identifying a component or system type inside a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key for `T`.
    #[inline]
    pub(crate) fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the type's name for logs and errors.
    #[inline]
    pub(crate) const fn name(self) -> &'static str {
        self.name
    }
}
