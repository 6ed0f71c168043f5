//! Global Architecture Constants.
//!
//! This module defines constants shared by several units. It includes:
//! 1. **Address Widths:** Implemented physical and virtual address widths.
//! 2. **Paging:** Base page size and the page-size range accepted by the TLB.
//! 3. **Vector Geometry:** Byte widths of the LSX and LASX register views.
//! 4. **Register Counts:** Sizes of the architectural register files.

/// Implemented physical address width in bits.
pub const PALEN: u32 = 48;

/// Implemented virtual address width in bits.
pub const VALEN: u32 = 48;

/// Base page shift (16 KiB pages are the Linux default, 4 KiB is the minimum).
pub const PAGE_SHIFT: u8 = 12;

/// Page size in bytes for the base page shift.
pub const PAGE_SIZE: u64 = 1 << PAGE_SHIFT;

/// Smallest page shift a TLB entry may carry.
pub const MIN_PAGE_SHIFT: u8 = 12;

/// Largest page shift a TLB entry may carry (1 GiB huge pages).
pub const MAX_PAGE_SHIFT: u8 = 30;

/// Number of general-purpose registers.
pub const GPR_COUNT: usize = 32;

/// Number of vector (and aliased floating-point) registers.
pub const VREG_COUNT: usize = 32;

/// Number of floating-point condition flags (`fcc0`-`fcc7`).
pub const FCC_COUNT: usize = 8;

/// Width of an LSX vector register in bytes (128 bits).
pub const LSX_BYTES: usize = 16;

/// Width of an LASX vector register in bytes (256 bits).
pub const LASX_BYTES: usize = 32;

/// Number of words returned by the `CPUCFG` instruction.
pub const CPUCFG_WORDS: usize = 21;

/// Width of the address-space identifier in bits.
pub const ASID_BITS: u32 = 10;

/// Mask for a valid ASID value.
pub const ASID_MASK: u16 = (1 << ASID_BITS) - 1;
