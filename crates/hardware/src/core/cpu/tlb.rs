//! TLB Maintenance and Address Translation.
//!
//! This module implements the CSR-driven TLB instructions and the address translation
//! pipeline of the CPU. It performs the following:
//! 1. **Entry Staging:** Building and exposing entries through `TLBEHI`/`TLBELO0/1`/`TLBIDX`,
//!    or the `TLBR*` copies while a refill is being handled.
//! 2. **Maintenance:** `tlbsrch`, `tlbrd`, `tlbwr`, `tlbfill`, `tlbclr`, `tlbflush`, `invtlb`.
//! 3. **Page Walk:** `lddir` and `ldpte` over guest memory.
//! 4. **Translation:** Direct mode, direct mapping windows, then the TLB.

use super::Cpu;
use crate::common::constants::{MAX_PAGE_SHIFT, MIN_PAGE_SHIFT, VALEN};
use crate::common::{AccessType, Exception, PhysAddr, VirtAddr};
use crate::core::arch::csr::{self, asid, crmd, tlbehi, tlbidx, tlbrera};
use crate::core::units::mmu::ptw::{self, GuestMemory, WalkGeometry};
use crate::core::units::mmu::tlb::{TlbEntry, TlbHalf, tlbelo};

/// Direct mapping window fields.
mod dmw {
    /// PLV0 may use the window.
    pub const PLV0: u64 = 1 << 0;
    /// VSEG field shift.
    pub const VSEG_SHIFT: u32 = 60;
}

/// `invtlb` operations.
pub mod invtlb_op {
    /// Invalidate every entry.
    pub const ALL: u32 = 0;
    /// Invalidate every entry (alias).
    pub const ALL_ALIAS: u32 = 1;
    /// Invalidate global entries.
    pub const GLOBAL: u32 = 2;
    /// Invalidate non-global entries.
    pub const NON_GLOBAL: u32 = 3;
    /// Invalidate non-global entries of an ASID.
    pub const ASID: u32 = 4;
    /// Invalidate non-global entries of an ASID covering an address.
    pub const ASID_PAGE: u32 = 5;
    /// Invalidate global entries, or entries of an ASID, covering an address.
    pub const ASID_OR_GLOBAL_PAGE: u32 = 6;
}

impl Cpu {
    /// True while a TLB refill exception is being handled.
    pub fn in_tlb_refill(&self) -> bool {
        self.csrs.get(csr::TLBRERA) & tlbrera::IS_TLBR != 0
    }

    /// The CSRs staging entry data: `(EHI, ELO0, ELO1)`.
    const fn staging_csrs(refill: bool) -> (u32, u32, u32) {
        if refill {
            (csr::TLBREHI, csr::TLBRELO0, csr::TLBRELO1)
        } else {
            (csr::TLBEHI, csr::TLBELO0, csr::TLBELO1)
        }
    }

    /// Builds the entry described by the staging CSRs, or `None` for an unsupported page size.
    fn staged_entry(&self) -> Option<TlbEntry> {
        let refill = self.in_tlb_refill();
        let (ehi, elo0, elo1) = Self::staging_csrs(refill);
        let ps_field = if refill {
            self.csrs.get(csr::TLBREHI) & tlbehi::PS_MASK
        } else {
            (self.csrs.get(csr::TLBIDX) >> tlbidx::PS_SHIFT) & tlbidx::PS_MASK
        };
        let ps = ps_field as u8;
        if !(MIN_PAGE_SHIFT..=MAX_PAGE_SHIFT).contains(&ps) {
            tracing::warn!(ps, "unsupported tlb page size ignored");
            return None;
        }
        let lo0 = self.csrs.get(elo0);
        let lo1 = self.csrs.get(elo1);
        let global = lo0 & lo1 & tlbelo::G != 0;
        let va = self.csrs.get(ehi) & tlbehi::VPPN_MASK;
        Some(TlbEntry::new(
            va,
            ps,
            self.asid(),
            global,
            [TlbHalf::from_tlbelo(lo0), TlbHalf::from_tlbelo(lo1)],
        ))
    }

    /// `tlbsrch`: sets `TLBIDX.Index` to the entry matching `(ASID, EHI.VPPN)`, or `TLBIDX.NE`.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0.
    pub fn tlbsrch(&mut self) -> Result<(), Exception> {
        self.require_kernel()?;
        let (ehi, _, _) = Self::staging_csrs(self.in_tlb_refill());
        let va = self.csrs.get(ehi) & tlbehi::VPPN_MASK;
        match self.tlb.probe(self.asid(), va) {
            Some(index) => {
                self.csrs.set_bits(csr::TLBIDX, tlbidx::NE | tlbidx::INDEX_MASK, index as u64);
            }
            None => self.csrs.set_bits(csr::TLBIDX, tlbidx::NE, tlbidx::NE),
        }
        Ok(())
    }

    /// `tlbrd`: loads the entry at `TLBIDX.Index` into the staging CSRs and `ASID`.
    ///
    /// An empty or out-of-range slot sets `TLBIDX.NE` and clears the staging registers.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0.
    pub fn tlbrd(&mut self) -> Result<(), Exception> {
        self.require_kernel()?;
        let index = (self.csrs.get(csr::TLBIDX) & tlbidx::INDEX_MASK) as usize;
        let ps_field = tlbidx::PS_MASK << tlbidx::PS_SHIFT;
        match self.tlb.entry(index).copied() {
            Some(entry) => {
                self.csrs.set(csr::TLBEHI, entry.start() & tlbehi::VPPN_MASK);
                self.csrs.set(csr::TLBELO0, entry.pages[0].to_tlbelo(entry.global));
                self.csrs.set(csr::TLBELO1, entry.pages[1].to_tlbelo(entry.global));
                self.csrs.set_bits(
                    csr::TLBIDX,
                    tlbidx::NE | ps_field,
                    u64::from(entry.page_shift) << tlbidx::PS_SHIFT,
                );
                self.csrs.set_bits(csr::ASID, asid::ASID_MASK, u64::from(entry.asid));
            }
            None => {
                self.csrs.set(csr::TLBEHI, 0);
                self.csrs.set(csr::TLBELO0, 0);
                self.csrs.set(csr::TLBELO1, 0);
                self.csrs.set_bits(csr::TLBIDX, tlbidx::NE | ps_field, tlbidx::NE);
                self.csrs.set_bits(csr::ASID, asid::ASID_MASK, 0);
            }
        }
        Ok(())
    }

    /// `tlbwr`: writes the staged entry at `TLBIDX.Index`; `TLBIDX.NE` empties the slot.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0.
    pub fn tlbwr(&mut self) -> Result<(), Exception> {
        self.require_kernel()?;
        let idx = self.csrs.get(csr::TLBIDX);
        let index = (idx & tlbidx::INDEX_MASK) as usize;
        if idx & tlbidx::NE != 0 {
            self.tlb.write(index, None);
        } else if let Some(entry) = self.staged_entry() {
            self.tlb.write(index, Some(entry));
        }
        Ok(())
    }

    /// `tlbfill`: inserts the staged entry, replacing overlapping entries or a victim.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0.
    pub fn tlbfill(&mut self) -> Result<(), Exception> {
        self.require_kernel()?;
        if let Some(entry) = self.staged_entry() {
            let _ = self.tlb.fill(entry);
        }
        Ok(())
    }

    /// `tlbclr`: removes the non-global entries of the current ASID.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0.
    pub fn tlbclr(&mut self) -> Result<(), Exception> {
        self.require_kernel()?;
        self.tlb.invalidate_asid(self.asid());
        Ok(())
    }

    /// `tlbflush`: removes every entry.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0.
    pub fn tlbflush(&mut self) -> Result<(), Exception> {
        self.require_kernel()?;
        self.tlb.invalidate_all();
        Ok(())
    }

    /// `invtlb op, rj, rk`: targeted invalidation, see [`invtlb_op`].
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0 and `IllegalImmediate` for an `op` above 6.
    pub fn invtlb(&mut self, op: u32, rj: u64, va: u64) -> Result<(), Exception> {
        self.require_kernel()?;
        let asid = (rj & asid::ASID_MASK) as u16;
        match op {
            invtlb_op::ALL | invtlb_op::ALL_ALIAS => self.tlb.invalidate_all(),
            invtlb_op::GLOBAL => self.tlb.invalidate_global(),
            invtlb_op::NON_GLOBAL => self.tlb.invalidate_non_global(),
            invtlb_op::ASID => self.tlb.invalidate_asid(asid),
            invtlb_op::ASID_PAGE => self.tlb.invalidate_page(asid, va),
            invtlb_op::ASID_OR_GLOBAL_PAGE => self.tlb.invalidate_page_or_global(asid, va),
            _ => {
                tracing::warn!(op, "invalid invtlb op");
                return Err(Exception::IllegalImmediate { field: "invtlb op", value: i64::from(op) });
            }
        }
        Ok(())
    }

    /// The address a page walk step indexes with: `TLBRBADV` in a refill, else `BADV`.
    fn walk_badv(&self) -> u64 {
        if self.in_tlb_refill() {
            self.csrs.get(csr::TLBRBADV)
        } else {
            self.csrs.get(csr::BADV)
        }
    }

    /// `lddir rd, rj, level`: one directory step of a software page walk.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0, `IllegalImmediate` for a bad level, or
    /// the fault of the memory read.
    pub fn lddir<M: GuestMemory + ?Sized>(
        &self,
        mem: &M,
        base: u64,
        level: u32,
    ) -> Result<u64, Exception> {
        self.require_kernel()?;
        let geometry = WalkGeometry::from_csrs(self.csrs.get(csr::PWCL), self.csrs.get(csr::PWCH));
        ptw::lddir(mem, &geometry, self.walk_badv(), base, level)
    }

    /// `ldpte rj, odd`: loads one leaf entry into `TLBRELO0`/`TLBRELO1` and sets
    /// `TLBREHI.PS`.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0, or the fault of the memory read.
    pub fn ldpte<M: GuestMemory + ?Sized>(
        &mut self,
        mem: &M,
        base: u64,
        odd: bool,
    ) -> Result<(), Exception> {
        self.require_kernel()?;
        let geometry = WalkGeometry::from_csrs(self.csrs.get(csr::PWCL), self.csrs.get(csr::PWCH));
        let leaf = ptw::ldpte(mem, &geometry, self.walk_badv(), base, odd)?;
        let dst = if odd { csr::TLBRELO1 } else { csr::TLBRELO0 };
        self.csrs.set(dst, leaf.tlbelo);
        self.csrs.set_bits(csr::TLBREHI, tlbehi::PS_MASK, u64::from(leaf.page_shift));
        Ok(())
    }

    /// Translates `va` for `access` at the current privilege level.
    ///
    /// In direct address mode (`CRMD.DA`) the address is used as is. In paged mode an
    /// enabled direct mapping window matching `VA[63:60]` applies first, then the TLB.
    ///
    /// # Errors
    ///
    /// Returns the address error for a non-canonical address, or the TLB fault.
    pub fn translate(&self, va: u64, access: AccessType) -> Result<PhysAddr, Exception> {
        let crmd_val = self.csrs.get(csr::CRMD);
        if crmd_val & crmd::DA != 0 {
            return Ok(PhysAddr::new(va));
        }

        let plv = self.plv();
        let plv_bit = dmw::PLV0 << plv.bits();
        for i in 0..csr::DMW_COUNT {
            let window = self.csrs.get(csr::DMW0 + i);
            if window & plv_bit != 0 && window >> dmw::VSEG_SHIFT == va >> dmw::VSEG_SHIFT {
                return Ok(PhysAddr::new(va));
            }
        }

        let upper = (va as i64) >> (VALEN - 1);
        if upper != 0 && upper != -1 {
            return Err(match access {
                AccessType::Fetch => Exception::FetchAddressError(va),
                AccessType::Load | AccessType::Store => Exception::MemoryAddressError(va),
            });
        }

        self.tlb.translate(self.asid(), VirtAddr::new(va), access, plv)
    }
}
