//! Software Page Walk Helpers.
//!
//! LoongArch refills the TLB in software: the refill handler walks the page table with
//! `lddir` (one directory level per instruction) and `ldpte` (the even or odd leaf entry).
//! The directory geometry comes from the `PWCL`/`PWCH` CSRs. This module holds the pure
//! parts of those two instructions:
//! 1. **Geometry:** Decoding per-level index base and width from `PWCL`/`PWCH`.
//! 2. **Directory Step:** Indexing one directory level, passing huge-page entries through.
//! 3. **Leaf Load:** Producing the `TLBELO` value and page size for one half of a pair.

use crate::common::{Exception, PhysAddr};

/// Huge-page marker in a directory entry.
pub const HUGE: u64 = 1 << 6;

/// Global bit position in a huge-page entry (moved to the `TLBELO.G` position on load).
pub const HUGE_GLOBAL_SHIFT: u32 = 12;

/// Global bit position in a `TLBELO` value.
const G_SHIFT: u32 = 6;

/// Size of a page-table entry in bytes (log2).
const PTE_SHIFT: u32 = 3;

/// Guest physical memory as seen by the page walker.
pub trait GuestMemory {
    /// Reads the 64-bit little-endian word at `pa`.
    ///
    /// # Errors
    ///
    /// Returns the fault the memory system raises for an unbacked address.
    fn read_u64(&self, pa: PhysAddr) -> Result<u64, Exception>;
}

/// Index geometry of one page-table level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelGeometry {
    /// Lowest virtual address bit of the index.
    pub base: u32,
    /// Number of index bits.
    pub width: u32,
}

impl LevelGeometry {
    /// Table index of `va` at this level.
    pub const fn index(self, va: u64) -> u64 {
        if self.width == 0 {
            return 0;
        }
        (va >> self.base) & ((1u64 << self.width) - 1)
    }
}

/// Walker geometry decoded from `PWCL` and `PWCH`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkGeometry {
    /// Leaf page table.
    pub pt: LevelGeometry,
    /// Directory levels 1 to 4.
    pub dirs: [LevelGeometry; 4],
}

impl WalkGeometry {
    /// Decodes the walker CSRs.
    pub const fn from_csrs(pwcl: u64, pwch: u64) -> Self {
        const fn field(v: u64, shift: u32, bits: u32) -> u32 {
            ((v >> shift) & ((1 << bits) - 1)) as u32
        }
        Self {
            pt: LevelGeometry { base: field(pwcl, 0, 5), width: field(pwcl, 5, 5) },
            dirs: [
                LevelGeometry { base: field(pwcl, 10, 5), width: field(pwcl, 15, 5) },
                LevelGeometry { base: field(pwcl, 20, 5), width: field(pwcl, 25, 5) },
                LevelGeometry { base: field(pwch, 0, 6), width: field(pwch, 6, 6) },
                LevelGeometry { base: field(pwch, 12, 6), width: field(pwch, 18, 6) },
            ],
        }
    }

    /// Geometry of directory `level` (1 to 4).
    pub const fn dir(&self, level: u32) -> Option<LevelGeometry> {
        match level {
            1..=4 => Some(self.dirs[(level - 1) as usize]),
            _ => None,
        }
    }
}

/// One directory step.
///
/// Returns `base` itself when it is a huge-page entry; otherwise reads the next-level table
/// address from `base + index * 8`.
///
/// # Errors
///
/// Returns `Exception::IllegalImmediate` for a level outside 1 to 4, or the memory fault.
pub fn lddir<M: GuestMemory + ?Sized>(
    mem: &M,
    geometry: &WalkGeometry,
    badv: u64,
    base: u64,
    level: u32,
) -> Result<u64, Exception> {
    let dir = geometry
        .dir(level)
        .ok_or(Exception::IllegalImmediate { field: "lddir level", value: i64::from(level) })?;
    if base & HUGE != 0 {
        return Ok(base);
    }
    let pa = PhysAddr::new(base | (dir.index(badv) << PTE_SHIFT));
    let next = mem.read_u64(pa)?;
    tracing::trace!(level, pa = %pa, next = format_args!("{next:#x}"), "lddir");
    Ok(next & PhysAddr::MASK)
}

/// Result of a leaf load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafPte {
    /// The value to place in `TLBRELO0` (even) or `TLBRELO1` (odd).
    pub tlbelo: u64,
    /// Page shift of the mapping.
    pub page_shift: u8,
}

/// Loads the even (`odd == false`) or odd leaf entry of the pair containing `badv`.
///
/// A huge-page `base` yields half of the huge page: the odd half is offset by half the
/// page size and the huge global bit is moved to the `TLBELO.G` position.
///
/// # Errors
///
/// Returns the memory fault of the leaf read.
pub fn ldpte<M: GuestMemory + ?Sized>(
    mem: &M,
    geometry: &WalkGeometry,
    badv: u64,
    base: u64,
    odd: bool,
) -> Result<LeafPte, Exception> {
    if base & HUGE != 0 {
        let shift = (geometry.pt.base + geometry.pt.width).saturating_sub(1);
        // The global bit is taken before the odd offset, which may carry into bit 12.
        let global = (base >> HUGE_GLOBAL_SHIFT) & 1;
        let mut pte = (base & !(1u64 << HUGE_GLOBAL_SHIFT) & !HUGE) | (global << G_SHIFT);
        if odd {
            pte = pte.wrapping_add(1u64 << shift);
        }
        return Ok(LeafPte { tlbelo: pte, page_shift: shift as u8 });
    }

    let index = (geometry.pt.index(badv) & !1) | u64::from(odd);
    let pa = PhysAddr::new(base | (index << PTE_SHIFT));
    let pte = mem.read_u64(pa)?;
    tracing::trace!(pa = %pa, odd, pte = format_args!("{pte:#x}"), "ldpte");
    Ok(LeafPte { tlbelo: pte, page_shift: geometry.pt.base as u8 })
}
