//! Exception and Fault definitions.
//!
//! This module defines the typed exception channel between the semantics helpers and
//! the external dispatch loop. It provides:
//! 1. **Exception Representation:** Every synchronous LoongArch exception a helper can raise.
//! 2. **Architectural Encoding:** Mapping to the `ESTAT.Ecode`/`EsubCode` fields and `BADV`.
//! 3. **Fault Packaging:** Pairing an exception with the guest PC for delivery.

use thiserror::Error;

use crate::core::arch::trap::ecode;
use crate::core::units::fpu::exception_flags::FpFlags;

/// Synchronous exceptions raised by instruction helpers.
///
/// A helper that raises an exception never produces its normal result: it returns
/// `Err(Exception)` and the caller unwinds to the dispatch loop. Address-carrying
/// variants hold the value that the hardware latches into `BADV`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Exception {
    /// TLB refill: no entry matched the (ASID, address) pair.
    #[error("TLB refill at {0:#x}")]
    TlbRefill(u64),

    /// Load hit an entry whose V bit is clear (PIL).
    #[error("page invalid for load at {0:#x}")]
    PageInvalidLoad(u64),

    /// Store hit an entry whose V bit is clear (PIS).
    #[error("page invalid for store at {0:#x}")]
    PageInvalidStore(u64),

    /// Fetch hit an entry whose V bit is clear (PIF).
    #[error("page invalid for fetch at {0:#x}")]
    PageInvalidFetch(u64),

    /// Store to a page whose D bit is clear (PME).
    #[error("page modification at {0:#x}")]
    PageModify(u64),

    /// Load from a page with NR set (PNR).
    #[error("page not readable at {0:#x}")]
    PageNotReadable(u64),

    /// Fetch from a page with NX set (PNX).
    #[error("page not executable at {0:#x}")]
    PageNotExecutable(u64),

    /// Access from a privilege level the page does not allow (PPI).
    #[error("page privilege violation at {0:#x}")]
    PagePrivilege(u64),

    /// Fetch address outside the implemented virtual address range (ADEF).
    #[error("fetch address error at {0:#x}")]
    FetchAddressError(u64),

    /// Data address outside the implemented virtual address range (ADEM).
    #[error("memory address error at {0:#x}")]
    MemoryAddressError(u64),

    /// Misaligned memory access (ALE).
    #[error("address alignment fault at {0:#x}")]
    AddressAlignment(u64),

    /// Bound check failure from `asrtle`/`asrtgt` or bounded loads (BCE).
    #[error("bound check failed at {0:#x}")]
    BoundCheck(u64),

    /// `syscall` (SYS).
    #[error("system call")]
    Syscall,

    /// `break` (BRK).
    #[error("breakpoint")]
    Breakpoint,

    /// Undefined instruction or CSR (INE). Carries the offending encoding or CSR number.
    #[error("instruction not exist ({0:#x})")]
    InstructionNotExist(u64),

    /// Privileged operation attempted above PLV0 (IPE).
    #[error("instruction privilege error")]
    InstructionPrivilege,

    /// Immediate operand outside the range its encoding field allows.
    ///
    /// Reported to software as INE, since no valid encoding produces it.
    #[error("illegal immediate {value} for field `{field}`")]
    IllegalImmediate {
        /// Name of the operand field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// Floating-point instruction while `EUEN.FPE` is clear (FPD).
    #[error("floating-point disabled")]
    FpDisabled,

    /// Enabled IEEE exception (FPE). Carries the `fcsr0.Cause` bits that trapped.
    #[error("floating-point exception (cause {cause:?})")]
    FloatingPoint {
        /// Flags raised by the trapping operation.
        cause: FpFlags,
    },

    /// Any other architectural exception code raised explicitly by translated code.
    #[error("exception ecode {ecode:#x} (value {value:#x})")]
    Raised {
        /// The `ESTAT.Ecode` value.
        ecode: u32,
        /// Value reported in `BADV`, if meaningful.
        value: u64,
    },
}

impl Exception {
    /// Builds the exception matching an architectural exception code.
    ///
    /// Used by translated code that raises `syscall`, `break` or INE directly.
    ///
    /// # Arguments
    ///
    /// * `code` - The `ESTAT.Ecode` value.
    /// * `value` - The faulting value (address or encoding), where the code uses one.
    pub const fn from_ecode(code: u32, value: u64) -> Self {
        match code {
            ecode::SYS => Self::Syscall,
            ecode::BRK => Self::Breakpoint,
            ecode::INE => Self::InstructionNotExist(value),
            ecode::IPE => Self::InstructionPrivilege,
            ecode::FPD => Self::FpDisabled,
            ecode::ALE => Self::AddressAlignment(value),
            ecode::BCE => Self::BoundCheck(value),
            _ => Self::Raised { ecode: code, value },
        }
    }

    /// Returns the `ESTAT.Ecode` value for this exception.
    pub const fn ecode(&self) -> u32 {
        match self {
            Self::TlbRefill(_) => ecode::TLBR,
            Self::PageInvalidLoad(_) => ecode::PIL,
            Self::PageInvalidStore(_) => ecode::PIS,
            Self::PageInvalidFetch(_) => ecode::PIF,
            Self::PageModify(_) => ecode::PME,
            Self::PageNotReadable(_) => ecode::PNR,
            Self::PageNotExecutable(_) => ecode::PNX,
            Self::PagePrivilege(_) => ecode::PPI,
            Self::FetchAddressError(_) | Self::MemoryAddressError(_) => ecode::ADE,
            Self::AddressAlignment(_) => ecode::ALE,
            Self::BoundCheck(_) => ecode::BCE,
            Self::Syscall => ecode::SYS,
            Self::Breakpoint => ecode::BRK,
            Self::InstructionNotExist(_) | Self::IllegalImmediate { .. } => ecode::INE,
            Self::InstructionPrivilege => ecode::IPE,
            Self::FpDisabled => ecode::FPD,
            Self::FloatingPoint { .. } => ecode::FPE,
            Self::Raised { ecode, .. } => *ecode,
        }
    }

    /// Returns the `ESTAT.EsubCode` value for this exception.
    pub const fn subcode(&self) -> u32 {
        match self {
            Self::MemoryAddressError(_) => 1,
            _ => 0,
        }
    }

    /// Returns the value latched into `BADV`, or `None` when `BADV` is left untouched.
    pub const fn badv(&self) -> Option<u64> {
        match self {
            Self::TlbRefill(va)
            | Self::PageInvalidLoad(va)
            | Self::PageInvalidStore(va)
            | Self::PageInvalidFetch(va)
            | Self::PageModify(va)
            | Self::PageNotReadable(va)
            | Self::PageNotExecutable(va)
            | Self::PagePrivilege(va)
            | Self::FetchAddressError(va)
            | Self::MemoryAddressError(va)
            | Self::AddressAlignment(va)
            | Self::BoundCheck(va) => Some(*va),
            _ => None,
        }
    }

    /// True for the exceptions that vector through the TLB refill entry.
    pub const fn is_tlb_refill(&self) -> bool {
        matches!(self, Self::TlbRefill(_))
    }
}

/// An exception paired with the PC of the instruction that raised it.
///
/// This is what the dispatch loop hands to [`Cpu::deliver`](crate::core::Cpu::deliver).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{exception} at pc {pc:#x}")]
pub struct Fault {
    /// The raised exception.
    pub exception: Exception,
    /// Guest PC of the faulting instruction.
    pub pc: u64,
}

impl Fault {
    /// Creates a fault record.
    pub const fn new(exception: Exception, pc: u64) -> Self {
        Self { exception, pc }
    }
}
