//! LoongArch architecture-specific components.
//!
//! This module contains the architectural state definitions shared by the execution
//! engines. It includes the following modules:
//! 1. **CSRs:** Privileged register numbers, field layouts and storage.
//! 2. **FPRs:** The vector register file and its scalar floating-point view.
//! 3. **GPRs:** General-purpose register file.
//! 4. **Modes:** Privilege levels.
//! 5. **Traps:** Exception codes and vectoring.

/// Control and Status Register (CSR) definitions and storage.
pub mod csr;

/// Vector and floating-point register file.
pub mod fpr;

/// General-Purpose Register file implementation.
pub mod gpr;

/// Privilege level definitions.
pub mod mode;

/// Exception codes and vectoring.
pub mod trap;
