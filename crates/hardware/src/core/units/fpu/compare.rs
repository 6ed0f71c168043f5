//! Floating-point comparison and classification.
//!
//! `fcmp.cond.{s,d}` tests a relation against a condition mask built from the
//! instruction's 5-bit `cond` field. The quiet form (`fcmp_c`) signals invalid only for
//! signalling NaNs; the signalling form (`fcmp_s`) signals for any NaN.

use super::Fpu;
use super::exception_flags::FpFlags;
use super::nan_handling::low_f32;
use super::softfloat::{self, F32, F64, Format, Relation};
use crate::common::error::Exception;

/// Mask bit: `a < b`.
pub const FCMP_LT: u32 = 1 << 0;
/// Mask bit: `a == b`.
pub const FCMP_EQ: u32 = 1 << 1;
/// Mask bit: unordered.
pub const FCMP_UN: u32 = 1 << 2;
/// Mask bit: `a > b`.
pub const FCMP_GT: u32 = 1 << 3;

/// Named condition masks.
pub mod cond {
    use super::{FCMP_EQ, FCMP_GT, FCMP_LT, FCMP_UN};

    /// Equal.
    pub const EQ: u32 = FCMP_EQ;
    /// Not equal (ordered).
    pub const NE: u32 = FCMP_LT | FCMP_GT;
    /// Less than.
    pub const LT: u32 = FCMP_LT;
    /// Less than or equal.
    pub const LE: u32 = FCMP_LT | FCMP_EQ;
    /// Greater than.
    pub const GT: u32 = FCMP_GT;
    /// Greater than or equal.
    pub const GE: u32 = FCMP_GT | FCMP_EQ;
    /// Ordered.
    pub const OR: u32 = FCMP_LT | FCMP_EQ | FCMP_GT;
    /// Unordered.
    pub const UN: u32 = FCMP_UN;
    /// Unordered or equal.
    pub const UEQ: u32 = FCMP_UN | FCMP_EQ;
    /// Unordered or not equal.
    pub const UNE: u32 = FCMP_UN | FCMP_LT | FCMP_GT;
    /// Unordered or less than.
    pub const ULT: u32 = FCMP_UN | FCMP_LT;
    /// Unordered or less than or equal.
    pub const ULE: u32 = FCMP_UN | FCMP_LT | FCMP_EQ;
}

/// Builds a condition mask from an instruction `cond` field.
///
/// Bit 0 selects LT, bit 1 EQ, bit 2 UN and bit 3 both LT and GT (not equal).
pub const fn fcmp_mask(cond: u32) -> u32 {
    let mut mask = 0;
    if cond & 0x1 != 0 {
        mask |= FCMP_LT;
    }
    if cond & 0x2 != 0 {
        mask |= FCMP_EQ;
    }
    if cond & 0x4 != 0 {
        mask |= FCMP_UN;
    }
    if cond & 0x8 != 0 {
        mask |= FCMP_GT | FCMP_LT;
    }
    mask
}

/// The mask bit of a relation.
const fn relation_bit(rel: Relation) -> u32 {
    match rel {
        Relation::Less => FCMP_LT,
        Relation::Equal => FCMP_EQ,
        Relation::Greater => FCMP_GT,
        Relation::Unordered => FCMP_UN,
    }
}

/// Compares and tests the relation against `mask`.
fn fcmp(a: u64, b: u64, mask: u32, signalling: bool, fmt: Format) -> (u64, FpFlags) {
    let rel = softfloat::compare(a, b, fmt);
    let invalid = if signalling {
        rel == Relation::Unordered
    } else {
        fmt.is_snan(a) || fmt.is_snan(b)
    };
    let flags = if invalid { FpFlags::NV } else { FpFlags::NONE };
    (u64::from(relation_bit(rel) & mask != 0), flags)
}

impl Fpu {
    /// Quiet comparison, single precision. Returns 1 when the relation is in `mask`.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when invalid is raised and enabled.
    pub fn fcmp_c_s(&mut self, fj: u64, fk: u64, mask: u32) -> Result<u64, Exception> {
        let (r, flags) = fcmp(low_f32(fj), low_f32(fk), mask, false, F32);
        self.finish(r, flags)
    }

    /// Signalling comparison, single precision.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when invalid is raised and enabled.
    pub fn fcmp_s_s(&mut self, fj: u64, fk: u64, mask: u32) -> Result<u64, Exception> {
        let (r, flags) = fcmp(low_f32(fj), low_f32(fk), mask, true, F32);
        self.finish(r, flags)
    }

    /// Quiet comparison, double precision.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when invalid is raised and enabled.
    pub fn fcmp_c_d(&mut self, fj: u64, fk: u64, mask: u32) -> Result<u64, Exception> {
        let (r, flags) = fcmp(fj, fk, mask, false, F64);
        self.finish(r, flags)
    }

    /// Signalling comparison, double precision.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when invalid is raised and enabled.
    pub fn fcmp_s_d(&mut self, fj: u64, fk: u64, mask: u32) -> Result<u64, Exception> {
        let (r, flags) = fcmp(fj, fk, mask, true, F64);
        self.finish(r, flags)
    }

    /// Classifies a single-precision value. Raises no flags.
    pub fn fclass_s(&self, fj: u64) -> u64 {
        u64::from(softfloat::classify(low_f32(fj), F32))
    }

    /// Classifies a double-precision value. Raises no flags.
    pub fn fclass_d(&self, fj: u64) -> u64 {
        u64::from(softfloat::classify(fj, F64))
    }
}
