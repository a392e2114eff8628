//! # Shared Access to a World
//!
//! A [`World`](crate::World) has no internal locking: every operation
//! assumes one thread of control. Hosts that need to touch the same world
//! from several threads wrap it in a [`SharedWorld`].
//!
//! ```text
//! Logic thread:   write() ─► exclusive &mut World
//! Render threads: read()  ─► shared &World (many at once)
//! ```
//!
//! A write handle waits for every read handle to drop, and the other way
//! round. Operations still run to completion one at a time.

mod shared;

pub use shared::{SharedWorld, WorldReadHandle, WorldWriteHandle};
