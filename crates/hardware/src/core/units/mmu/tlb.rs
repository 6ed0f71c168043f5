//! Translation Lookaside Buffer (TLB).
//!
//! A fully associative, software-managed TLB in the LoongArch layout. Each entry maps an
//! aligned pair of pages (even/odd) for one ASID, or for every ASID when the global bit is
//! set. It provides:
//! 1. **Lookup:** Matching an `(ASID, virtual address)` pair to an entry half.
//! 2. **Fill:** Inserting an entry after removing every entry it would overlap, so that at
//!    most one entry matches any pair.
//! 3. **Invalidation:** By page, ASID, global bit, or everything (`invtlb`).
//! 4. **Translation:** Permission-checked virtual-to-physical translation.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::common::constants::{MAX_PAGE_SHIFT, MIN_PAGE_SHIFT, PALEN, VALEN};
use crate::common::{AccessType, Exception, PhysAddr, VirtAddr};
use crate::core::arch::mode::PrivilegeLevel;

use super::replacement::RandomVictim;

/// Bit layout of `TLBELO0`/`TLBELO1`.
pub mod tlbelo {
    /// Valid.
    pub const V: u64 = 1 << 0;
    /// Dirty (writable).
    pub const D: u64 = 1 << 1;
    /// Privilege level field shift (bits 3:2).
    pub const PLV_SHIFT: u32 = 2;
    /// Memory access type field shift (bits 5:4).
    pub const MAT_SHIFT: u32 = 4;
    /// Global.
    pub const G: u64 = 1 << 6;
    /// Physical page number shift.
    pub const PPN_SHIFT: u32 = 12;
    /// Not readable.
    pub const NR: u64 = 1 << 61;
    /// Not executable.
    pub const NX: u64 = 1 << 62;
    /// Restricted privilege level (exact match required).
    pub const RPLV: u64 = 1 << 63;
}

/// Mask selecting the implemented virtual address bits.
const VA_MASK: u64 = (1 << VALEN) - 1;

/// Mask of the physical page number field.
const PPN_MASK: u64 = (1 << (PALEN - tlbelo::PPN_SHIFT)) - 1;

/// Shift of the VPPN field (`VA[VALEN-1:13]`).
pub const VPPN_SHIFT: u32 = 13;

/// One page of a TLB entry pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TlbHalf {
    /// Physical page number (in 4 KiB units).
    pub ppn: u64,
    /// Valid.
    pub valid: bool,
    /// Dirty: stores are allowed.
    pub dirty: bool,
    /// Loads are forbidden.
    pub no_read: bool,
    /// Fetches are forbidden.
    pub no_exec: bool,
    /// Least privileged level allowed (or the only one, with `rplv`).
    pub plv: PrivilegeLevel,
    /// Memory access type (cache attribute).
    pub mat: u8,
    /// Restricted privilege: only `plv` itself may access.
    pub rplv: bool,
}

impl TlbHalf {
    /// Decodes a `TLBELO` value. The G bit is handled by the entry.
    pub const fn from_tlbelo(lo: u64) -> Self {
        Self {
            ppn: (lo >> tlbelo::PPN_SHIFT) & PPN_MASK,
            valid: lo & tlbelo::V != 0,
            dirty: lo & tlbelo::D != 0,
            no_read: lo & tlbelo::NR != 0,
            no_exec: lo & tlbelo::NX != 0,
            plv: PrivilegeLevel::from_bits(lo >> tlbelo::PLV_SHIFT),
            mat: ((lo >> tlbelo::MAT_SHIFT) & 0x3) as u8,
            rplv: lo & tlbelo::RPLV != 0,
        }
    }

    /// Encodes the half as a `TLBELO` value, setting G when `global`.
    pub const fn to_tlbelo(&self, global: bool) -> u64 {
        let mut lo = (self.ppn & PPN_MASK) << tlbelo::PPN_SHIFT
            | self.plv.bits() << tlbelo::PLV_SHIFT
            | ((self.mat as u64) & 0x3) << tlbelo::MAT_SHIFT;
        if self.valid {
            lo |= tlbelo::V;
        }
        if self.dirty {
            lo |= tlbelo::D;
        }
        if global {
            lo |= tlbelo::G;
        }
        if self.no_read {
            lo |= tlbelo::NR;
        }
        if self.no_exec {
            lo |= tlbelo::NX;
        }
        if self.rplv {
            lo |= tlbelo::RPLV;
        }
        lo
    }
}

/// A TLB entry mapping an aligned pair of `2^page_shift`-byte pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TlbEntry {
    /// Virtual page-pair number, `VA[VALEN-1:13]` (bits below the pair size are zero).
    pub vppn: u64,
    /// log2 of the page size.
    pub page_shift: u8,
    /// Address-space identifier.
    pub asid: u16,
    /// Matches every ASID.
    pub global: bool,
    /// Even (`[0]`) and odd (`[1]`) pages.
    pub pages: [TlbHalf; 2],
}

impl TlbEntry {
    /// Creates an entry covering the page pair that contains `va`.
    ///
    /// # Arguments
    ///
    /// * `va` - Any address inside the pair; the low bits are dropped.
    /// * `page_shift` - log2 of the page size, clamped to `12..=30`.
    /// * `asid` - Owning address space (ignored for matching when `global`).
    /// * `global` - Match every ASID.
    /// * `pages` - Even and odd halves.
    pub const fn new(va: u64, page_shift: u8, asid: u16, global: bool, pages: [TlbHalf; 2]) -> Self {
        let page_shift = clamp_page_shift(page_shift);
        let pair_mask = (1u64 << (page_shift as u32 + 1)) - 1;
        Self { vppn: ((va & VA_MASK) & !pair_mask) >> VPPN_SHIFT, page_shift, asid, global, pages }
    }

    /// First virtual address covered by the pair.
    pub const fn start(&self) -> u64 {
        (self.vppn << VPPN_SHIFT) & !(self.span() - 1)
    }

    /// Size of the page pair in bytes.
    pub const fn span(&self) -> u64 {
        1u64 << (clamp_page_shift(self.page_shift) as u32 + 1)
    }

    /// True when the pair covers `va`.
    pub const fn covers(&self, va: u64) -> bool {
        let va = va & VA_MASK;
        va >= self.start() && va - self.start() < self.span()
    }

    /// True when the entry matches `(asid, va)`.
    pub const fn matches(&self, asid: u16, va: u64) -> bool {
        (self.global || self.asid == asid) && self.covers(va)
    }

    /// True when both entries could match some common `(ASID, address)` pair.
    pub const fn conflicts_with(&self, other: &Self) -> bool {
        let asid_overlap = self.global || other.global || self.asid == other.asid;
        let range_overlap =
            self.start() < other.start() + other.span() && other.start() < self.start() + self.span();
        asid_overlap && range_overlap
    }

    /// The half selected by `va` (bit `page_shift`).
    pub const fn half_for(&self, va: u64) -> &TlbHalf {
        &self.pages[((va >> clamp_page_shift(self.page_shift)) & 1) as usize]
    }
}

/// Limits a page shift to the sizes the TLB supports; `page_shift` is a public field.
const fn clamp_page_shift(page_shift: u8) -> u8 {
    if page_shift < MIN_PAGE_SHIFT {
        MIN_PAGE_SHIFT
    } else if page_shift > MAX_PAGE_SHIFT {
        MAX_PAGE_SHIFT
    } else {
        page_shift
    }
}

/// A successful lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlbHit {
    /// Slot index of the matching entry.
    pub index: usize,
    /// The half selected by the looked-up address.
    pub half: TlbHalf,
    /// Page size of the entry.
    pub page_shift: u8,
}

/// Snapshot of the TLB event counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TlbStats {
    /// Lookups that matched an entry.
    pub hits: u64,
    /// Lookups that raised a refill.
    pub misses: u64,
    /// Entries inserted by `fill`.
    pub fills: u64,
    /// Valid entries displaced by a fill (capacity or overlap) or an overlapping write.
    pub evictions: u64,
    /// Entries removed by invalidation.
    pub invalidations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fills: AtomicU64,
    evictions: AtomicU64,
    invalidations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, n: u64) {
        let _ = counter.fetch_add(n, Ordering::Relaxed);
    }
}

/// Translation Lookaside Buffer.
#[derive(Debug)]
pub struct Tlb {
    slots: Vec<Option<TlbEntry>>,
    victim: RandomVictim,
    counters: Counters,
}

impl Tlb {
    /// Creates an empty TLB.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of entry slots (at least 1).
    /// * `seed` - Seed for the eviction sequence.
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            victim: RandomVictim::new(seed),
            counters: Counters::default(),
        }
    }

    /// Number of entry slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// The entry in slot `index`, if any.
    pub fn entry(&self, index: usize) -> Option<&TlbEntry> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Occupied slots in index order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &TlbEntry)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| s.as_ref().map(|e| (i, e)))
    }

    /// Snapshot of the event counters.
    pub fn stats(&self) -> TlbStats {
        let c = &self.counters;
        TlbStats {
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            fills: c.fills.load(Ordering::Relaxed),
            evictions: c.evictions.load(Ordering::Relaxed),
            invalidations: c.invalidations.load(Ordering::Relaxed),
        }
    }

    /// Index of the entry matching `(asid, va)`. Never faults and does not count as a lookup.
    pub fn probe(&self, asid: u16, va: u64) -> Option<usize> {
        self.entries().find(|(_, e)| e.matches(asid, va)).map(|(i, _)| i)
    }

    /// Looks up `(asid, va)`.
    ///
    /// # Errors
    ///
    /// Returns `Exception::TlbRefill` when no entry matches.
    pub fn lookup(&self, asid: u16, va: u64) -> Result<TlbHit, Exception> {
        match self.entries().find(|(_, e)| e.matches(asid, va)) {
            Some((index, e)) => {
                Counters::bump(&self.counters.hits, 1);
                Ok(TlbHit {
                    index,
                    half: *e.half_for(va),
                    page_shift: clamp_page_shift(e.page_shift),
                })
            }
            None => {
                Counters::bump(&self.counters.misses, 1);
                tracing::trace!(asid, va = format_args!("{va:#x}"), "tlb miss");
                Err(Exception::TlbRefill(va))
            }
        }
    }

    /// Inserts `entry`, first removing every entry it conflicts with.
    ///
    /// The entry goes into the first free slot, or replaces a pseudo-randomly chosen
    /// victim when the TLB is full.
    ///
    /// # Returns
    ///
    /// The slot index written.
    pub fn fill(&mut self, entry: TlbEntry) -> usize {
        let mut displaced = 0;
        for slot in &mut self.slots {
            if slot.is_some_and(|e| e.conflicts_with(&entry)) {
                *slot = None;
                displaced += 1;
            }
        }

        let index = match self.slots.iter().position(Option::is_none) {
            Some(free) => free,
            None => {
                displaced += 1;
                self.victim.pick(self.slots.len())
            }
        };
        self.slots[index] = Some(entry);

        Counters::bump(&self.counters.fills, 1);
        Counters::bump(&self.counters.evictions, displaced);
        tracing::debug!(
            index,
            asid = entry.asid,
            global = entry.global,
            start = format_args!("{:#x}", entry.start()),
            page_shift = entry.page_shift,
            displaced,
            "tlb fill"
        );
        index
    }

    /// Writes slot `index` directly (`tlbwr`). `None` empties the slot.
    ///
    /// Entries in other slots that conflict with the written entry are removed and counted
    /// as evictions. Out-of-range indices are ignored.
    pub fn write(&mut self, index: usize, entry: Option<TlbEntry>) {
        if index >= self.slots.len() {
            tracing::warn!(index, capacity = self.slots.len(), "tlb write out of range");
            return;
        }

        let mut displaced = 0;
        if let Some(new) = entry {
            for (i, slot) in self.slots.iter_mut().enumerate() {
                if i != index && slot.is_some_and(|e| e.conflicts_with(&new)) {
                    *slot = None;
                    displaced += 1;
                }
            }
        }
        self.slots[index] = entry;

        Counters::bump(&self.counters.evictions, displaced);
        tracing::debug!(index, present = entry.is_some(), displaced, "tlb write");
    }

    /// Removes every entry for which `pred` holds.
    fn invalidate_where(&mut self, what: &'static str, pred: impl Fn(&TlbEntry) -> bool) {
        let mut removed = 0u64;
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(&pred) {
                *slot = None;
                removed += 1;
            }
        }
        Counters::bump(&self.counters.invalidations, removed);
        tracing::debug!(what, removed, "tlb invalidate");
    }

    /// Removes the non-global entries of `asid` covering `va`.
    pub fn invalidate_page(&mut self, asid: u16, va: u64) {
        self.invalidate_where("page", |e| !e.global && e.asid == asid && e.covers(va));
    }

    /// Removes the entries covering `va` that are global or belong to `asid`.
    pub fn invalidate_page_or_global(&mut self, asid: u16, va: u64) {
        self.invalidate_where("page-or-global", |e| e.matches(asid, va));
    }

    /// Removes every non-global entry of `asid`.
    pub fn invalidate_asid(&mut self, asid: u16) {
        self.invalidate_where("asid", |e| !e.global && e.asid == asid);
    }

    /// Removes every global entry.
    pub fn invalidate_global(&mut self) {
        self.invalidate_where("global", |e| e.global);
    }

    /// Removes every non-global entry.
    pub fn invalidate_non_global(&mut self) {
        self.invalidate_where("non-global", |e| !e.global);
    }

    /// Removes every entry.
    pub fn invalidate_all(&mut self) {
        self.invalidate_where("all", |_| true);
    }

    /// Translates `va` for an access at privilege level `plv`.
    ///
    /// Checks, in order: entry present (refill), V, privilege, NR on loads, NX on fetches,
    /// D on stores.
    ///
    /// # Errors
    ///
    /// Returns the translation fault for the first failing check.
    pub fn translate(
        &self,
        asid: u16,
        va: VirtAddr,
        access: AccessType,
        plv: PrivilegeLevel,
    ) -> Result<PhysAddr, Exception> {
        let v = va.val();
        let hit = self.lookup(asid, v)?;
        let half = hit.half;

        if !half.valid {
            return Err(match access {
                AccessType::Load => Exception::PageInvalidLoad(v),
                AccessType::Store => Exception::PageInvalidStore(v),
                AccessType::Fetch => Exception::PageInvalidFetch(v),
            });
        }
        let plv_ok = if half.rplv { plv == half.plv } else { plv <= half.plv };
        if !plv_ok {
            return Err(Exception::PagePrivilege(v));
        }
        match access {
            AccessType::Load if half.no_read => return Err(Exception::PageNotReadable(v)),
            AccessType::Fetch if half.no_exec => return Err(Exception::PageNotExecutable(v)),
            AccessType::Store if !half.dirty => return Err(Exception::PageModify(v)),
            _ => {}
        }

        let offset_mask = (1u64 << hit.page_shift) - 1;
        let base = (half.ppn << tlbelo::PPN_SHIFT) & !offset_mask;
        Ok(PhysAddr::new(base | va.page_offset(hit.page_shift)))
    }
}
