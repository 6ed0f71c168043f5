//! Exception Handling Logic.
//!
//! This module implements exception entry and return for the CPU. It performs the
//! following:
//! 1. **Raising:** Building the typed exception for an explicit `syscall`/`break`/INE.
//! 2. **Delivery:** Saving the pre-exception state into `PRMD`/`ERA`/`ESTAT`/`BADV` (or the
//!    `TLBR*` set for a refill), entering PLV0 with interrupts disabled and vectoring.
//! 3. **Return:** `ertn` from either the general or the refill path.
//! 4. **Idle:** Parking the CPU until an interrupt is pending.

use super::Cpu;
use crate::common::{Exception, Fault};
use crate::core::arch::csr::{self, crmd, estat, prmd, tlbehi, tlbrera};
use crate::core::arch::trap::{TrapHandler, ecode};

/// Bits of `CRMD` saved into `PRMD`/`TLBRPRMD` (PLV and IE line up with PPLV and PIE).
const SAVED_MODE: u64 = crmd::PLV_MASK | crmd::IE;

impl Cpu {
    /// Raises the exception with architectural code `ecode`.
    ///
    /// # Errors
    ///
    /// Always returns the exception.
    pub fn raise_exception<T>(&self, ecode: u32, value: u64) -> Result<T, Exception> {
        let exception = Exception::from_ecode(ecode, value);
        tracing::trace!(pc = format_args!("{:#x}", self.pc), %exception, "raise");
        Err(exception)
    }

    /// Delivers `fault` and returns the handler address, which also becomes `pc`.
    pub fn deliver(&mut self, fault: Fault) -> u64 {
        let Fault { exception, pc } = fault;
        let mode = self.csrs.get(csr::CRMD) & SAVED_MODE;
        let badv = exception.badv();

        if exception.is_tlb_refill() {
            self.csrs.set_bits(csr::TLBRPRMD, prmd::PPLV_MASK | prmd::PIE, mode);
            self.csrs.set(csr::TLBRERA, (pc & !0x3) | tlbrera::IS_TLBR);
            if let Some(va) = badv {
                self.csrs.set(csr::TLBRBADV, va);
                self.csrs.set_bits(csr::TLBREHI, tlbehi::VPPN_MASK, va);
            }
            // refill handlers run untranslated
            self.csrs.set_bits(csr::CRMD, SAVED_MODE | crmd::DA | crmd::PG, crmd::DA);
        } else {
            self.csrs.set_bits(csr::PRMD, prmd::PPLV_MASK | prmd::PIE, mode);
            self.csrs.set(csr::ERA, pc);
            if let Some(va) = badv {
                self.csrs.set(csr::BADV, va);
                if exception.ecode() <= ecode::PPI {
                    self.csrs.set_bits(csr::TLBEHI, tlbehi::VPPN_MASK, va);
                }
            }
            self.csrs.set_bits(csr::CRMD, SAVED_MODE, 0);
        }

        let codes = (u64::from(exception.ecode()) & estat::ECODE_MASK) << estat::ECODE_SHIFT
            | (u64::from(exception.subcode()) & estat::ESUBCODE_MASK) << estat::ESUBCODE_SHIFT;
        let code_mask = estat::ECODE_MASK << estat::ECODE_SHIFT
            | estat::ESUBCODE_MASK << estat::ESUBCODE_SHIFT;
        self.csrs.set_bits(csr::ESTAT, code_mask, codes);

        let target = TrapHandler::vector(
            &exception,
            self.csrs.get(csr::EENTRY),
            self.csrs.get(csr::TLBRENTRY),
            self.vector_spacing(),
        );
        tracing::debug!(
            %exception,
            pc = format_args!("{pc:#x}"),
            badv = ?badv,
            handler = format_args!("{target:#x}"),
            "exception delivered"
        );
        self.idle = false;
        self.pc = target;
        target
    }

    /// Returns from an exception handler (`ertn`) and returns the new `pc`.
    ///
    /// Inside a refill handler (`TLBRERA.IsTLBR` set) the mode comes from `TLBRPRMD`, the
    /// target from `TLBRERA`, and paged translation is re-enabled.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0.
    pub fn ertn(&mut self) -> Result<u64, Exception> {
        self.require_kernel()?;
        let tlbrera_val = self.csrs.get(csr::TLBRERA);
        let target = if tlbrera_val & tlbrera::IS_TLBR != 0 {
            let saved = self.csrs.get(csr::TLBRPRMD) & (prmd::PPLV_MASK | prmd::PIE);
            self.csrs.set_bits(csr::CRMD, SAVED_MODE | crmd::DA | crmd::PG, saved | crmd::PG);
            self.csrs.set(csr::TLBRERA, tlbrera_val & !tlbrera::IS_TLBR);
            tlbrera_val & !0x3
        } else {
            let saved = self.csrs.get(csr::PRMD) & (prmd::PPLV_MASK | prmd::PIE);
            self.csrs.set_bits(csr::CRMD, SAVED_MODE, saved);
            self.csrs.get(csr::ERA)
        };
        tracing::debug!(resume = format_args!("{target:#x}"), plv = %self.plv(), "ertn");
        self.pc = target;
        Ok(target)
    }

    /// Parks the CPU (`idle`) until [`Cpu::advance`] finds an enabled pending interrupt.
    ///
    /// # Errors
    ///
    /// Returns `InstructionPrivilege` outside PLV0.
    pub fn idle(&mut self) -> Result<(), Exception> {
        self.require_kernel()?;
        self.idle = !self.interrupt_pending();
        tracing::debug!(parked = self.idle, "idle");
        Ok(())
    }
}
