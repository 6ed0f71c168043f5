//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used by the TLB.
//! These types are used for the following:
//! 1. **Permission Validation:** Checking NR/NX/D permissions on a TLB hit.
//! 2. **Fault Generation:** Picking the PIL/PIS/PIF page-invalid exception.

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Instruction fetch access. Denied by the NX bit.
    Fetch,

    /// Data load access. Denied by the NR bit.
    Load,

    /// Data store access. Requires the D (dirty/writable) bit.
    Store,
}
