//! Vector and Floating-Point Register File.
//!
//! LoongArch keeps one register file for scalar floating point, LSX and LASX. This module
//! performs the following:
//! 1. **Storage:** 32 registers of 256 bits (`xr0`-`xr31`).
//! 2. **Aliasing:** `f<n>` is the low 64 bits of `xr<n>`; `vr<n>` is the low 128 bits.
//! 3. **Scalar Writes:** A scalar write replaces the low 64 bits and leaves the rest alone.

use crate::common::constants::VREG_COUNT;
use crate::core::units::simd::VReg;

/// Vector register file with the aliased floating-point view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VRegFile {
    regs: [VReg; VREG_COUNT],
}

impl VRegFile {
    /// Creates a register file with every register zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads vector register `idx`.
    pub fn vreg(&self, idx: usize) -> &VReg {
        &self.regs[idx]
    }

    /// Mutable access to vector register `idx`.
    pub fn vreg_mut(&mut self, idx: usize) -> &mut VReg {
        &mut self.regs[idx]
    }

    /// Replaces vector register `idx`.
    pub fn set_vreg(&mut self, idx: usize, value: VReg) {
        self.regs[idx] = value;
    }

    /// Reads floating-point register `f<idx>` as raw bits.
    pub fn fpr(&self, idx: usize) -> u64 {
        self.regs[idx].low_u64()
    }

    /// Writes floating-point register `f<idx>` from raw bits.
    pub fn set_fpr(&mut self, idx: usize, bits: u64) {
        self.regs[idx].set_low_u64(bits);
    }
}
