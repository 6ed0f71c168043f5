//! Common utilities and types used throughout the semantics core.
//!
//! This module provides fundamental building blocks shared by every unit. It includes:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Constants:** Address widths, page sizes, and register-file geometry.
//! 3. **Memory Access:** Classification of fetch/load/store accesses.
//! 4. **Error Handling:** The typed exception channel and fault records.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the core.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Exception and fault definitions.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{PAGE_SHIFT, PAGE_SIZE};
pub use data::AccessType;
pub use error::{Exception, Fault};
