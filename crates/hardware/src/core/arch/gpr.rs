//! LoongArch General-Purpose Register File.
//!
//! This module implements the integer register file. It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`r0`-`r31`).
//! 2. **Invariant Enforcement:** Ensures that register `r0` is hardwired to zero.
//! 3. **Debugging:** Provides a formatted dump of the complete register state.

use crate::common::constants::GPR_COUNT;

/// General-Purpose Register file.
///
/// Register `r0` reads as zero and ignores writes.
#[derive(Clone, Debug, Default)]
pub struct Gpr {
    regs: [u64; GPR_COUNT],
}

impl Gpr {
    /// Creates a register file with every register cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a general-purpose register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    ///
    /// # Returns
    ///
    /// The 64-bit register value. Register `r0` always returns 0.
    pub fn read(&self, idx: usize) -> u64 {
        if idx == 0 { 0 } else { self.regs[idx] }
    }

    /// Writes a value to a general-purpose register. Writes to `r0` are discarded.
    pub fn write(&mut self, idx: usize, val: u64) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Formats all registers in pairs, one pair per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for i in (0..GPR_COUNT).step_by(2) {
            out.push_str(&format!(
                "r{:<2}={:#018x} r{:<2}={:#018x}\n",
                i,
                self.read(i),
                i + 1,
                self.read(i + 1)
            ));
        }
        out
    }
}
