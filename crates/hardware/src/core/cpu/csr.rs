//! CSR Access Logic.
//!
//! This module implements the `csrrd`/`csrwr`/`csrxchg` instructions for the CPU. It
//! performs the following:
//! 1. **Access Checks:** PLV0 is required; unimplemented numbers raise INE.
//! 2. **Computed Reads:** `PGD` is selected from `PGDL`/`PGDH` by the bad address, `TVAL`
//!    reads the live timer count.
//! 3. **Write Side Effects:** Timer (re)arming, timer interrupt clear, and field masking for
//!    `ESTAT` and `ASID`.
//! 4. **Introspection:** A serialisable snapshot of the privileged state.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Cpu;
use crate::common::Exception;
use crate::core::arch::csr::{self, csr_info, estat, tcfg, ticlr, tlbrera};
use crate::core::arch::mode::PrivilegeLevel;
use crate::core::units::mmu::TlbStats;

/// Serialisable view of the privileged state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CsrSnapshot {
    /// Program counter.
    pub pc: u64,
    /// Current privilege level.
    pub plv: PrivilegeLevel,
    /// Every implemented CSR by mnemonic.
    pub csrs: BTreeMap<&'static str, u64>,
    /// `fcsr0`.
    pub fcsr0: u32,
    /// Stable counter.
    pub counter: u64,
    /// TLB event counters.
    pub tlb: TlbStats,
}

impl Cpu {
    /// Reads CSR `num` (`csrrd`).
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0 and `InstructionNotExist` for an
    /// unimplemented CSR.
    pub fn csr_read(&self, num: u32) -> Result<u64, Exception> {
        self.require_kernel()?;
        match num {
            csr::PGD => Ok(self.csrrd_pgd()),
            csr::TVAL => Ok(self.csrrd_tval()),
            _ => self.csrs.read(num).ok_or(Exception::InstructionNotExist(u64::from(num))),
        }
    }

    /// Writes CSR `num` (`csrwr`), returning the previous value.
    ///
    /// Read-only fields keep their value.
    ///
    /// # Errors
    ///
    /// As [`Cpu::csr_read`].
    pub fn csr_write(&mut self, num: u32, val: u64) -> Result<u64, Exception> {
        self.require_kernel()?;
        let old = self.csr_read(num)?;
        match num {
            csr::ESTAT => self.csrwr_estat(val),
            csr::ASID => self.csrwr_asid(val),
            csr::TCFG => self.csrwr_tcfg(val),
            csr::TICLR => self.csrwr_ticlr(val),
            _ => {
                let _ = self.csrs.write(num, val);
            }
        }
        tracing::trace!(csr = csr_info(num).map_or("?", |c| c.name), old, val, "csr write");
        Ok(old)
    }

    /// Writes the bits of `mask` in CSR `num` (`csrxchg`), returning the previous value.
    ///
    /// # Errors
    ///
    /// As [`Cpu::csr_read`].
    pub fn csr_xchg(&mut self, num: u32, val: u64, mask: u64) -> Result<u64, Exception> {
        let old = self.csr_read(num)?;
        let _ = self.csr_write(num, (old & !mask) | (val & mask))?;
        Ok(old)
    }

    /// `PGD`: `PGDH` when the faulting address has bit 63 set, else `PGDL`.
    ///
    /// The faulting address is `TLBRBADV` inside a TLB refill handler and `BADV` otherwise.
    pub fn csrrd_pgd(&self) -> u64 {
        let badv = if self.csrs.get(csr::TLBRERA) & tlbrera::IS_TLBR != 0 {
            self.csrs.get(csr::TLBRBADV)
        } else {
            self.csrs.get(csr::BADV)
        };
        if badv >> 63 != 0 {
            self.csrs.get(csr::PGDH)
        } else {
            self.csrs.get(csr::PGDL)
        }
    }

    /// `TVAL`: the live timer count.
    pub fn csrrd_tval(&self) -> u64 {
        self.csrs.get(csr::TVAL)
    }

    /// `ESTAT`: only the two software interrupt bits are writable.
    pub fn csrwr_estat(&mut self, val: u64) {
        self.csrs.set_bits(csr::ESTAT, estat::IS_SW_MASK, val);
    }

    /// `ASID`: only the ASID field is writable; `ASIDBITS` is preserved.
    pub fn csrwr_asid(&mut self, val: u64) {
        let _ = self.csrs.write(csr::ASID, val);
        tracing::debug!(asid = self.asid(), "asid switch");
    }

    /// `TCFG`: stores the configuration and (re)arms the timer from `InitVal` when enabled.
    pub fn csrwr_tcfg(&mut self, val: u64) {
        let _ = self.csrs.write(csr::TCFG, val);
        let cfg = self.csrs.get(csr::TCFG);
        self.timer_armed = cfg & tcfg::EN != 0;
        if self.timer_armed {
            self.csrs.set(csr::TVAL, cfg & tcfg::INITVAL_MASK);
        }
        tracing::debug!(
            enabled = self.timer_armed,
            periodic = cfg & tcfg::PERIODIC != 0,
            init = cfg & tcfg::INITVAL_MASK,
            "timer configured"
        );
    }

    /// `TICLR`: writing 1 to bit 0 clears the timer interrupt. The register reads as zero.
    pub fn csrwr_ticlr(&mut self, val: u64) {
        if val & ticlr::CLR != 0 {
            self.csrs.set_bits(csr::ESTAT, estat::TI, 0);
            tracing::debug!("timer interrupt cleared");
        }
    }

    /// Serialisable snapshot of the privileged state.
    pub fn csr_snapshot(&self) -> CsrSnapshot {
        let mut csrs: BTreeMap<&'static str, u64> =
            self.csrs.iter().map(|(info, value)| (info.name, value)).collect();
        let _ = csrs.insert("pgd", self.csrrd_pgd());
        CsrSnapshot {
            pc: self.pc,
            plv: self.plv(),
            csrs,
            fcsr0: self.fpu.fcsr(),
            counter: self.counter,
            tlb: self.tlb.stats(),
        }
    }
}
