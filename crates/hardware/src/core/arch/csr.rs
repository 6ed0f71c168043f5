//! Control and Status Register (CSR) definitions and storage.
//!
//! This module implements the LoongArch privileged CSR file. It provides:
//! 1. **Numbers:** Constants for every implemented CSR.
//! 2. **Field Layouts:** Bit positions and masks for the fields the core interprets.
//! 3. **Write Masks:** Per-register masks so read-only and reserved bits survive writes.
//! 4. **Storage:** The `Csrs` table with masked architectural writes and raw hardware updates.
//!
//! Side effects of individual registers (timer, PGD, ESTAT) live with the CPU; this file
//! only knows how to store values.

use crate::core::units::mmu::tlb::tlbelo;

/// Current mode.
pub const CRMD: u32 = 0x0;
/// Pre-exception mode.
pub const PRMD: u32 = 0x1;
/// Extended unit enable.
pub const EUEN: u32 = 0x2;
/// Miscellaneous controls.
pub const MISC: u32 = 0x3;
/// Exception configuration.
pub const ECFG: u32 = 0x4;
/// Exception status.
pub const ESTAT: u32 = 0x5;
/// Exception return address.
pub const ERA: u32 = 0x6;
/// Bad virtual address.
pub const BADV: u32 = 0x7;
/// Bad instruction.
pub const BADI: u32 = 0x8;
/// Exception entry base.
pub const EENTRY: u32 = 0xc;
/// TLB index.
pub const TLBIDX: u32 = 0x10;
/// TLB entry high (VPPN).
pub const TLBEHI: u32 = 0x11;
/// TLB entry low, even page.
pub const TLBELO0: u32 = 0x12;
/// TLB entry low, odd page.
pub const TLBELO1: u32 = 0x13;
/// Address space identifier.
pub const ASID: u32 = 0x18;
/// Page table base for the lower half.
pub const PGDL: u32 = 0x19;
/// Page table base for the upper half.
pub const PGDH: u32 = 0x1a;
/// Page table base selected by `BADV` (read-only).
pub const PGD: u32 = 0x1b;
/// Page walk control, low levels.
pub const PWCL: u32 = 0x1c;
/// Page walk control, high levels.
pub const PWCH: u32 = 0x1d;
/// STLB page size.
pub const STLBPS: u32 = 0x1e;
/// Reduced virtual address configuration.
pub const RVACFG: u32 = 0x1f;
/// Processor number.
pub const CPUID: u32 = 0x20;
/// Privileged resource configuration 1.
pub const PRCFG1: u32 = 0x21;
/// Privileged resource configuration 2 (supported page sizes).
pub const PRCFG2: u32 = 0x22;
/// Privileged resource configuration 3 (TLB geometry).
pub const PRCFG3: u32 = 0x23;
/// First scratch register.
pub const SAVE0: u32 = 0x30;
/// Number of scratch registers.
pub const SAVE_COUNT: u32 = 8;
/// Timer identifier.
pub const TID: u32 = 0x40;
/// Timer configuration.
pub const TCFG: u32 = 0x41;
/// Timer value (read-only).
pub const TVAL: u32 = 0x42;
/// Counter compensation.
pub const CNTC: u32 = 0x43;
/// Timer interrupt clear.
pub const TICLR: u32 = 0x44;
/// LLBit control.
pub const LLBCTL: u32 = 0x60;
/// TLB refill exception entry.
pub const TLBRENTRY: u32 = 0x88;
/// TLB refill bad virtual address.
pub const TLBRBADV: u32 = 0x89;
/// TLB refill exception return address.
pub const TLBRERA: u32 = 0x8a;
/// TLB refill scratch.
pub const TLBRSAVE: u32 = 0x8b;
/// TLB refill entry low, even page.
pub const TLBRELO0: u32 = 0x8c;
/// TLB refill entry low, odd page.
pub const TLBRELO1: u32 = 0x8d;
/// TLB refill entry high.
pub const TLBREHI: u32 = 0x8e;
/// TLB refill pre-exception mode.
pub const TLBRPRMD: u32 = 0x8f;
/// First direct mapping window.
pub const DMW0: u32 = 0x180;
/// Number of direct mapping windows.
pub const DMW_COUNT: u32 = 4;

/// `CRMD` fields.
pub mod crmd {
    /// Current privilege level.
    pub const PLV_MASK: u64 = 0x3;
    /// Global interrupt enable.
    pub const IE: u64 = 1 << 2;
    /// Direct address translation.
    pub const DA: u64 = 1 << 3;
    /// Paged translation.
    pub const PG: u64 = 1 << 4;
}

/// `PRMD` and `TLBRPRMD` fields.
pub mod prmd {
    /// Previous privilege level.
    pub const PPLV_MASK: u64 = 0x3;
    /// Previous interrupt enable.
    pub const PIE: u64 = 1 << 2;
}

/// `EUEN` fields.
pub mod euen {
    /// Scalar floating point enable.
    pub const FPE: u64 = 1 << 0;
    /// LSX enable.
    pub const SXE: u64 = 1 << 1;
    /// LASX enable.
    pub const ASXE: u64 = 1 << 2;
}

/// `ECFG` fields.
pub mod ecfg {
    /// Vector spacing field shift.
    pub const VS_SHIFT: u32 = 16;
    /// Vector spacing field mask (after shifting).
    pub const VS_MASK: u64 = 0x7;
}

/// `ESTAT` fields.
pub mod estat {
    /// Software interrupt bits (the only writable field).
    pub const IS_SW_MASK: u64 = 0x3;
    /// Timer interrupt pending.
    pub const TI: u64 = 1 << 11;
    /// Exception code field shift.
    pub const ECODE_SHIFT: u32 = 16;
    /// Exception code field mask (after shifting).
    pub const ECODE_MASK: u64 = 0x3f;
    /// Exception sub-code field shift.
    pub const ESUBCODE_SHIFT: u32 = 22;
    /// Exception sub-code field mask (after shifting).
    pub const ESUBCODE_MASK: u64 = 0x1ff;
}

/// `TLBIDX` fields.
pub mod tlbidx {
    /// Entry index.
    pub const INDEX_MASK: u64 = 0xffff;
    /// Page size field shift.
    pub const PS_SHIFT: u32 = 24;
    /// Page size field mask (after shifting).
    pub const PS_MASK: u64 = 0x3f;
    /// Entry not present.
    pub const NE: u64 = 1 << 31;
}

/// `TLBEHI` and `TLBREHI` fields.
pub mod tlbehi {
    use crate::common::constants::VALEN;

    /// Virtual page-pair number, `VA[VALEN-1:13]` in place.
    pub const VPPN_MASK: u64 = ((1u64 << VALEN) - 1) & !0x1fff;
    /// Page size field of `TLBREHI`.
    pub const PS_MASK: u64 = 0x3f;
}

/// `TLBRERA` fields.
pub mod tlbrera {
    /// Set while a TLB refill exception is being handled.
    pub const IS_TLBR: u64 = 1 << 0;
}

/// `ASID` fields.
pub mod asid {
    /// The writable ASID field.
    pub const ASID_MASK: u64 = 0x3ff;
    /// ASID width field shift (read-only).
    pub const ASIDBITS_SHIFT: u32 = 16;
}

/// `TCFG` fields.
pub mod tcfg {
    /// Timer enable.
    pub const EN: u64 = 1 << 0;
    /// Periodic reload.
    pub const PERIODIC: u64 = 1 << 1;
    /// Initial count (the low two bits of the count are implied zero).
    pub const INITVAL_MASK: u64 = ((1u64 << 48) - 1) & !0x3;
}

/// `TICLR` fields.
pub mod ticlr {
    /// Write 1 to clear the timer interrupt.
    pub const CLR: u64 = 1 << 0;
}

const ALL: u64 = u64::MAX;
const PAGE_BASE: u64 = !0xfff;
const TLBELO_MASK: u64 = tlbelo::V
    | tlbelo::D
    | (0x3 << tlbelo::PLV_SHIFT)
    | (0x3 << tlbelo::MAT_SHIFT)
    | tlbelo::G
    | (((1u64 << crate::common::constants::PALEN) - 1) & !0xfff)
    | tlbelo::NR
    | tlbelo::NX
    | tlbelo::RPLV;

/// Static description of one CSR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsrInfo {
    /// CSR number.
    pub num: u32,
    /// Mnemonic.
    pub name: &'static str,
    /// Bits software may change with `csrwr`/`csrxchg`.
    pub write_mask: u64,
}

const fn info(num: u32, name: &'static str, write_mask: u64) -> CsrInfo {
    CsrInfo { num, name, write_mask }
}

/// Every implemented CSR, sorted by number.
pub const CSR_TABLE: &[CsrInfo] = &[
    info(CRMD, "crmd", 0x3ff),
    info(PRMD, "prmd", 0xf),
    info(EUEN, "euen", 0xf),
    info(MISC, "misc", 0x7_feee),
    info(ECFG, "ecfg", 0x7_1bff),
    info(ESTAT, "estat", estat::IS_SW_MASK),
    info(ERA, "era", ALL),
    info(BADV, "badv", ALL),
    info(BADI, "badi", 0),
    info(EENTRY, "eentry", PAGE_BASE),
    info(TLBIDX, "tlbidx", tlbidx::NE | (tlbidx::PS_MASK << tlbidx::PS_SHIFT) | tlbidx::INDEX_MASK),
    info(TLBEHI, "tlbehi", tlbehi::VPPN_MASK),
    info(TLBELO0, "tlbelo0", TLBELO_MASK),
    info(TLBELO1, "tlbelo1", TLBELO_MASK),
    info(ASID, "asid", asid::ASID_MASK),
    info(PGDL, "pgdl", PAGE_BASE),
    info(PGDH, "pgdh", PAGE_BASE),
    info(PGD, "pgd", 0),
    info(PWCL, "pwcl", 0xffff_ffff),
    info(PWCH, "pwch", 0x00ff_ffff),
    info(STLBPS, "stlbps", 0x3f),
    info(RVACFG, "rvacfg", 0xf),
    info(CPUID, "cpuid", 0),
    info(PRCFG1, "prcfg1", 0),
    info(PRCFG2, "prcfg2", 0),
    info(PRCFG3, "prcfg3", 0),
    info(SAVE0, "save0", ALL),
    info(SAVE0 + 1, "save1", ALL),
    info(SAVE0 + 2, "save2", ALL),
    info(SAVE0 + 3, "save3", ALL),
    info(SAVE0 + 4, "save4", ALL),
    info(SAVE0 + 5, "save5", ALL),
    info(SAVE0 + 6, "save6", ALL),
    info(SAVE0 + 7, "save7", ALL),
    info(TID, "tid", 0xffff_ffff),
    info(TCFG, "tcfg", tcfg::INITVAL_MASK | tcfg::PERIODIC | tcfg::EN),
    info(TVAL, "tval", 0),
    info(CNTC, "cntc", ALL),
    info(TICLR, "ticlr", ticlr::CLR),
    info(LLBCTL, "llbctl", 0x6),
    info(TLBRENTRY, "tlbrentry", PAGE_BASE),
    info(TLBRBADV, "tlbrbadv", ALL),
    info(TLBRERA, "tlbrera", !0x2),
    info(TLBRSAVE, "tlbrsave", ALL),
    info(TLBRELO0, "tlbrelo0", TLBELO_MASK),
    info(TLBRELO1, "tlbrelo1", TLBELO_MASK),
    info(TLBREHI, "tlbrehi", tlbehi::VPPN_MASK | tlbehi::PS_MASK),
    info(TLBRPRMD, "tlbrprmd", 0x17),
    info(DMW0, "dmw0", 0xf000_0000_0000_0039),
    info(DMW0 + 1, "dmw1", 0xf000_0000_0000_0039),
    info(DMW0 + 2, "dmw2", 0xf000_0000_0000_0039),
    info(DMW0 + 3, "dmw3", 0xf000_0000_0000_0039),
];

/// Looks up the description of CSR `num`.
pub fn csr_info(num: u32) -> Option<&'static CsrInfo> {
    CSR_TABLE.binary_search_by_key(&num, |c| c.num).ok().map(|i| &CSR_TABLE[i])
}

/// CSR file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Csrs {
    values: Vec<u64>,
}

impl Csrs {
    /// Creates a CSR file in its reset state.
    ///
    /// # Arguments
    ///
    /// * `tlb_entries` - TLB capacity reported through `PRCFG3`.
    /// * `cpu_id` - Value of `CPUID`.
    pub fn new(tlb_entries: usize, cpu_id: u64) -> Self {
        let mut csrs = Self { values: vec![0; CSR_TABLE.len()] };
        csrs.set(CRMD, crmd::DA);
        csrs.set(ASID, 10 << asid::ASIDBITS_SHIFT);
        csrs.set(CPUID, cpu_id & 0x1ff);
        // SAVE_NUM, TIMER_BITS - 1, VSMAX
        csrs.set(PRCFG1, u64::from(SAVE_COUNT) | (47 << 4) | (7 << 12));
        // page sizes 4 KiB .. 1 GiB
        csrs.set(PRCFG2, 0x7fff_f000);
        let mtlb = (tlb_entries.clamp(1, 256) - 1) as u64;
        csrs.set(PRCFG3, 1 | (mtlb << 4));
        csrs
    }

    /// Architectural read. `None` for an unimplemented CSR.
    pub fn read(&self, num: u32) -> Option<u64> {
        Self::slot(num).map(|i| self.values[i])
    }

    /// Architectural write: only bits in the register's write mask change.
    ///
    /// # Returns
    ///
    /// The previous value, or `None` for an unimplemented CSR.
    pub fn write(&mut self, num: u32, val: u64) -> Option<u64> {
        let i = Self::slot(num)?;
        let mask = CSR_TABLE[i].write_mask;
        let old = self.values[i];
        self.values[i] = (old & !mask) | (val & mask);
        Some(old)
    }

    /// Raw value of a CSR (0 when unimplemented).
    pub fn get(&self, num: u32) -> u64 {
        self.read(num).unwrap_or(0)
    }

    /// Hardware update that bypasses the write mask. Unimplemented numbers are ignored.
    pub fn set(&mut self, num: u32, val: u64) {
        if let Some(i) = Self::slot(num) {
            self.values[i] = val;
        }
    }

    /// Replaces the bits of `mask` in CSR `num` with those of `val`, bypassing the write mask.
    pub fn set_bits(&mut self, num: u32, mask: u64, val: u64) {
        let old = self.get(num);
        self.set(num, (old & !mask) | (val & mask));
    }

    /// All implemented CSRs with their current values, in number order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static CsrInfo, u64)> + '_ {
        CSR_TABLE.iter().zip(self.values.iter().copied())
    }

    fn slot(num: u32) -> Option<usize> {
        CSR_TABLE.binary_search_by_key(&num, |c| c.num).ok()
    }
}
