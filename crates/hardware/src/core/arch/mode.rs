//! LoongArch Privilege Levels.
//!
//! This module defines the four privilege levels (PLV0-PLV3) of the LoongArch
//! privileged architecture. It implements the following:
//! 1. **Level Classification:** PLV0 is the kernel level; PLV3 is the usual user level.
//! 2. **Serialization:** Conversion between the 2-bit `CRMD.PLV` field and enum variants.
//! 3. **Observability:** Human-readable naming and display formatting.

use serde::Serialize;

/// Privilege level.
///
/// Lower numbers are more privileged. Only PLV0 may execute privileged
/// instructions (CSR access, TLB maintenance, `ertn`, `idle`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PrivilegeLevel {
    /// Most privileged level; the kernel runs here.
    #[default]
    Plv0 = 0,
    /// Privilege level 1.
    Plv1 = 1,
    /// Privilege level 2.
    Plv2 = 2,
    /// Least privileged level; user applications run here.
    Plv3 = 3,
}

impl PrivilegeLevel {
    /// Converts the low two bits of `val` to a privilege level.
    pub const fn from_bits(val: u64) -> Self {
        match val & 0x3 {
            0 => Self::Plv0,
            1 => Self::Plv1,
            2 => Self::Plv2,
            _ => Self::Plv3,
        }
    }

    /// Returns the 2-bit encoding of the level.
    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// True when privileged instructions are allowed.
    pub const fn is_kernel(self) -> bool {
        matches!(self, Self::Plv0)
    }

    /// Returns the human-readable name of the level.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plv0 => "PLV0",
            Self::Plv1 => "PLV1",
            Self::Plv2 => "PLV2",
            Self::Plv3 => "PLV3",
        }
    }
}

impl std::fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
