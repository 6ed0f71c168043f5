//! Physical and Virtual Address types.
//!
//! This module defines strong types for guest physical and virtual addresses so the
//! TLB and page-walk helpers cannot mix the two spaces. It provides the following:
//! 1. **Type Safety:** Distinguishes virtual and physical addresses at compile time.
//! 2. **Page Arithmetic:** Offsets and page numbers for any supported page size.
//! 3. **Address Width:** Truncation to the implemented physical address width.

use super::constants::PALEN;

/// A guest virtual address.
///
/// Virtual addresses are produced by load/store/fetch address generation and are
/// translated by the TLB before memory is touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A guest physical address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Byte offset within a page of `1 << page_shift` bytes.
    ///
    /// # Arguments
    ///
    /// * `page_shift` - log2 of the page size (12 for 4 KiB, 14 for 16 KiB, ...).
    #[inline(always)]
    pub const fn page_offset(self, page_shift: u8) -> u64 {
        self.0 & ((1u64 << page_shift) - 1)
    }

    /// Virtual page number for a page of `1 << page_shift` bytes.
    #[inline(always)]
    pub const fn page_number(self, page_shift: u8) -> u64 {
        self.0 >> page_shift
    }
}

impl PhysAddr {
    /// Mask selecting the implemented physical address bits.
    pub const MASK: u64 = (1u64 << PALEN) - 1;

    /// Creates a new physical address, truncated to the implemented width.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw address value; bits at and above `PALEN` are dropped.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr & Self::MASK)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "va:{:#018x}", self.0)
    }
}

impl std::fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pa:{:#014x}", self.0)
    }
}
