//! Floating-point rounding modes.
//!
//! LoongArch encodes the dynamic rounding mode in `fcsr0.RM` (bits 9:8):
//!
//! | Value | Mode | Description                    |
//! |-------|------|--------------------------------|
//! | 0b00  | RNE  | Round to Nearest, ties to Even |
//! | 0b01  | RZ   | Round towards Zero             |
//! | 0b10  | RP   | Round Up (towards +∞)          |
//! | 0b11  | RM   | Round Down (towards −∞)        |
//!
//! The `ftintrm`/`ftintrp`/`ftintrz`/`ftintrne` conversions carry a static mode
//! and ignore `fcsr0.RM`.

use serde::{Deserialize, Serialize};

/// LoongArch rounding mode encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoundingMode {
    /// Round to Nearest, ties to Even (default IEEE mode).
    #[default]
    Rne = 0b00,
    /// Round towards Zero.
    Rz = 0b01,
    /// Round Up (towards +∞).
    Rp = 0b10,
    /// Round Down (towards −∞).
    Rm = 0b11,
}

impl RoundingMode {
    /// Decodes the low two bits of `bits`. Every encoding is valid.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0b00 => Self::Rne,
            0b01 => Self::Rz,
            0b10 => Self::Rp,
            _ => Self::Rm,
        }
    }

    /// Returns the 2-bit encoding.
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Decides whether a truncated magnitude must be incremented.
    ///
    /// # Arguments
    ///
    /// * `sign` - Sign of the value being rounded (true for negative).
    /// * `lsb` - Least significant kept bit.
    /// * `round` - First discarded bit.
    /// * `sticky` - OR of all bits below the round bit.
    pub const fn round_up(self, sign: bool, lsb: bool, round: bool, sticky: bool) -> bool {
        match self {
            Self::Rne => round && (sticky || lsb),
            Self::Rz => false,
            Self::Rp => !sign && (round || sticky),
            Self::Rm => sign && (round || sticky),
        }
    }

    /// True when an overflowing result of the given sign rounds to infinity
    /// rather than to the largest finite value.
    pub const fn overflows_to_infinity(self, sign: bool) -> bool {
        match self {
            Self::Rne => true,
            Self::Rz => false,
            Self::Rp => !sign,
            Self::Rm => sign,
        }
    }
}
