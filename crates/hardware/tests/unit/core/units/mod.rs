/// Bit reversal, bound checks and CRC accumulation.
pub mod alu;

/// Soft-float arithmetic, conversion, comparison and `fcsr0` handling.
pub mod fpu;

/// TLB, page-walk helpers and shared translation cache.
pub mod mmu;
