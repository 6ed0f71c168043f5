//! Execution units.
//!
//! This module contains the instruction-semantics engines that translated code calls
//! into: integer helpers, the numeric lane primitives, the floating-point unit, the
//! vector unit and the memory management unit.

/// Integer helpers (bit reversal, CRC, bound checks).
pub mod alu;

/// Floating-Point Unit for IEEE 754 operations.
pub mod fpu;

/// Memory Management Unit with the TLB and page walk helpers.
pub mod mmu;

/// Width-generic integer lane primitives.
pub mod numeric;

/// LSX/LASX vector unit.
pub mod simd;
