//! # Signatures
//!
//! A signature is a 64-bit mask naming a set of component types.
//! Each registered component type owns exactly one bit.
//!
//! - Attached to an entity: the types it currently holds
//! - Attached to a system: the types an entity must hold to be matched

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use bytemuck::{Pod, Zeroable};

use crate::error::{EcsError, EcsResult};

/// Maximum number of component types a world can register.
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Bitmask identifying a set of component types.
///
/// `#[repr(transparent)]` over `u64` so signature tables can be viewed as
/// raw words with `bytemuck::cast_slice`.
///
/// # Example
///
/// ```rust,ignore
/// let mut movers = Signature::EMPTY;
/// movers.union(world.component_signature::<Position>()?);
/// movers.union(world.component_signature::<Velocity>()?);
/// assert!(entity_signature.contains(movers));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Signature(u64);

impl Signature {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Creates a signature from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Creates a signature with only `bit` set.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidSignatureBit`] if `bit >= 64`.
    #[inline]
    pub fn with_bit(bit: usize) -> EcsResult<Self> {
        let mut signature = Self::EMPTY;
        signature.enable_bit(bit)?;
        Ok(signature)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Adds every type in `other` to this set.
    #[inline]
    pub fn union(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Removes every type in `other` from this set.
    #[inline]
    pub fn subtract(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Returns `true` if this set is a superset of `other`.
    ///
    /// Every signature contains [`Signature::EMPTY`].
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Sets a single bit.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidSignatureBit`] if `bit >= 64`.
    #[inline]
    pub fn enable_bit(&mut self, bit: usize) -> EcsResult<()> {
        self.0 |= Self::mask(bit)?;
        Ok(())
    }

    /// Clears a single bit.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidSignatureBit`] if `bit >= 64`.
    #[inline]
    pub fn disable_bit(&mut self, bit: usize) -> EcsResult<()> {
        self.0 &= !Self::mask(bit)?;
        Ok(())
    }

    /// Returns `true` if `bit` is set. Out-of-range bits are never set.
    #[inline]
    #[must_use]
    pub fn has_bit(self, bit: usize) -> bool {
        Self::mask(bit).is_ok_and(|mask| self.0 & mask != 0)
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Returns `true` if no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the set.
    #[inline]
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    fn mask(bit: usize) -> EcsResult<u64> {
        if bit < MAX_COMPONENT_TYPES {
            Ok(1u64 << bit)
        } else {
            Err(EcsError::InvalidSignatureBit(bit))
        }
    }
}

impl BitOr for Signature {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Signature {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.union(rhs);
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#066b}", self.0)
    }
}
