//! Exception Codes and Vectoring.
//!
//! This module holds the architectural exception encoding used by the exception channel
//! and by delivery. It performs the following:
//! 1. **Encoding:** `ESTAT.Ecode` values for every exception class.
//! 2. **Vectoring:** Computes the handler entry point from `EENTRY`/`TLBRENTRY` and `ECFG.VS`.

use crate::common::error::Exception;

/// `ESTAT.Ecode` values.
pub mod ecode {
    /// Interrupt.
    pub const INT: u32 = 0x00;
    /// Page invalid for load.
    pub const PIL: u32 = 0x01;
    /// Page invalid for store.
    pub const PIS: u32 = 0x02;
    /// Page invalid for fetch.
    pub const PIF: u32 = 0x03;
    /// Page modification (store to a clean page).
    pub const PME: u32 = 0x04;
    /// Page not readable.
    pub const PNR: u32 = 0x05;
    /// Page not executable.
    pub const PNX: u32 = 0x06;
    /// Page privilege illegal.
    pub const PPI: u32 = 0x07;
    /// Address error (ADEF with subcode 0, ADEM with subcode 1).
    pub const ADE: u32 = 0x08;
    /// Address alignment error.
    pub const ALE: u32 = 0x09;
    /// Bound check error.
    pub const BCE: u32 = 0x0a;
    /// System call.
    pub const SYS: u32 = 0x0b;
    /// Breakpoint.
    pub const BRK: u32 = 0x0c;
    /// Instruction not exist.
    pub const INE: u32 = 0x0d;
    /// Instruction privilege error.
    pub const IPE: u32 = 0x0e;
    /// Floating-point disabled.
    pub const FPD: u32 = 0x0f;
    /// LSX disabled.
    pub const SXD: u32 = 0x10;
    /// LASX disabled.
    pub const ASXD: u32 = 0x11;
    /// Floating-point exception.
    pub const FPE: u32 = 0x12;
    /// TLB refill.
    pub const TLBR: u32 = 0x3f;
}

/// Exception vectoring helpers.
#[derive(Debug)]
pub struct TrapHandler;

impl TrapHandler {
    /// Computes the handler address for an exception.
    ///
    /// TLB refill always enters at `TLBRENTRY`. Other exceptions enter at `EENTRY`, offset
    /// by `ecode` vector slots when `ECFG.VS` is non-zero (slot size `4 << VS` bytes).
    ///
    /// # Arguments
    ///
    /// * `exception` - The exception being delivered.
    /// * `eentry` - Current `EENTRY` value.
    /// * `tlbrentry` - Current `TLBRENTRY` value.
    /// * `vs` - The `ECFG.VS` field (0-7).
    ///
    /// # Returns
    ///
    /// The guest address execution resumes at.
    pub fn vector(exception: &Exception, eentry: u64, tlbrentry: u64, vs: u32) -> u64 {
        if exception.is_tlb_refill() {
            return tlbrentry;
        }
        let slot = if vs == 0 { 0 } else { 4u64 << vs };
        eentry.wrapping_add(u64::from(exception.ecode()) * slot)
    }
}
