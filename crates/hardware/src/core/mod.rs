//! Core processor state and semantics.
//!
//! This module contains the architectural state of a LoongArch64 CPU and the execution
//! engines that operate on it.

/// Architecture-specific components (CSRs, register files, privilege levels, exception codes).
pub mod arch;

/// CPU state container and privileged operations.
pub mod cpu;

/// Execution units (integer helpers, FPU, vector unit, MMU).
pub mod units;

pub use self::cpu::Cpu;
