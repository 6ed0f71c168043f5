//! Floating-point exception flags.
//!
//! LoongArch reports five IEEE 754 exception conditions. The same 5-bit layout is used
//! by the `Enables` (bits 4:0), `Flags` (bits 20:16) and `Cause` (bits 28:24) fields of
//! `fcsr0`:
//!
//! | Bit | Flag | Description         |
//! |-----|------|---------------------|
//! |  4  | V    | Invalid Operation   |
//! |  3  | Z    | Divide by Zero      |
//! |  2  | O    | Overflow            |
//! |  1  | U    | Underflow           |
//! |  0  | I    | Inexact             |

use std::ops::{BitOr, BitOrAssign};

/// Set of raised floating-point exception flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FpFlags(u8);

impl FpFlags {
    /// No exceptions raised.
    pub const NONE: Self = Self(0);
    /// Invalid Operation.
    pub const NV: Self = Self(1 << 4);
    /// Divide by Zero.
    pub const DZ: Self = Self(1 << 3);
    /// Overflow.
    pub const OF: Self = Self(1 << 2);
    /// Underflow.
    pub const UF: Self = Self(1 << 1);
    /// Inexact.
    pub const NX: Self = Self(1 << 0);

    /// Mask of the five defined flag bits.
    pub const MASK: u8 = 0x1f;

    /// Builds a flag set from the low five bits of `bits`.
    pub const fn from_bits(bits: u32) -> Self {
        Self((bits as u8) & Self::MASK)
    }

    /// Returns the raw 5-bit flag value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if no flags are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns true if any flag in `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl BitOr for FpFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FpFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
