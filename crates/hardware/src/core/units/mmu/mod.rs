//! Memory Management Unit (MMU).
//!
//! LoongArch translation is TLB-only: the hardware never walks page tables on its own, a
//! miss raises a TLB refill exception and system software fills the TLB. This module
//! therefore contains:
//! 1. **TLB:** The fully associative entry store with lookup, fill and invalidation.
//! 2. **Victim Selection:** Deterministic eviction when the TLB is full.
//! 3. **Page Walk Helpers:** The `lddir`/`ldpte` steps used by refill handlers.
//! 4. **Sharing:** A lock-protected TLB handle for multi-CPU use.

/// Page walk helpers (`lddir`, `ldpte`).
pub mod ptw;

/// Deterministic victim selection.
pub mod replacement;

/// Lock-protected TLB shared between CPUs.
pub mod shared;

/// Translation Lookaside Buffer.
pub mod tlb;

pub use self::shared::SharedTlb;
pub use self::tlb::{Tlb, TlbEntry, TlbHalf, TlbHit, TlbStats};
