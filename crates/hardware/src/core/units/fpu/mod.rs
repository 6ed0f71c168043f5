//! Floating-Point Unit (FPU).
//!
//! This module implements the scalar floating-point instruction semantics together with
//! the `fcsr0` control/status register and the eight condition flags. Every operation is
//! computed by the integer [`softfloat`] engine, so results are bit-exact under all four
//! rounding modes and raise the exact IEEE exception flags.
//!
//! Operations are organized into submodules:
//! - [`softfloat`]: Exact IEEE 754 arithmetic with a single rounding.
//! - [`nan_handling`]: NaN boxing and default NaNs.
//! - [`rounding_modes`]: The `fcsr0.RM` encoding.
//! - [`exception_flags`]: The five IEEE flags.
//! - [`compare`]: `fcmp` condition masks and `fclass`.
//! - [`convert`]: Format and integer conversions, `frint`.

/// Exact IEEE 754 arithmetic engine.
pub mod softfloat;

/// NaN boxing and default NaNs.
pub mod nan_handling;

/// Rounding mode definitions and support.
pub mod rounding_modes;

/// Floating-point exception flag types.
pub mod exception_flags;

/// Comparison and classification.
pub mod compare;

/// Format and integer conversions.
pub mod convert;

use serde::Serialize;

use crate::common::constants::FCC_COUNT;
use crate::common::error::Exception;

use self::exception_flags::FpFlags;
use self::nan_handling::{box_f32, low_f32};
use self::rounding_modes::RoundingMode;
use self::softfloat::{F32, F64, Format};

/// `fcsr0.Enables` field mask (bits 4:0).
pub const FCSR_ENABLES_MASK: u32 = 0x0000_001f;

/// `fcsr0.RM` field mask (bits 9:8).
pub const FCSR_RM_MASK: u32 = 0x0000_0300;

/// `fcsr0.Flags` field mask (bits 20:16).
pub const FCSR_FLAGS_MASK: u32 = 0x001f_0000;

/// `fcsr0.Cause` field mask (bits 28:24).
pub const FCSR_CAUSE_MASK: u32 = 0x1f00_0000;

/// Every writable bit of `fcsr0`.
pub const FCSR0_MASK: u32 = FCSR_ENABLES_MASK | FCSR_RM_MASK | FCSR_FLAGS_MASK | FCSR_CAUSE_MASK;

const FCSR_RM_SHIFT: u32 = 8;
const FCSR_FLAGS_SHIFT: u32 = 16;
const FCSR_CAUSE_SHIFT: u32 = 24;

/// Views of `fcsr0` selected by the `fcsr` index of `movgr2fcsr`/`movfcsr2gr`.
const FCSR_VIEWS: [u32; 4] = [
    FCSR0_MASK,
    FCSR_ENABLES_MASK,
    FCSR_FLAGS_MASK | FCSR_CAUSE_MASK,
    FCSR_RM_MASK,
];

/// Floating-point control state and scalar operations.
///
/// Holds `fcsr0` and the condition flags `fcc0`-`fcc7`. Operands and results are raw
/// 64-bit register values; single-precision results are NaN-boxed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Fpu {
    fcsr0: u32,
    fcc: [bool; FCC_COUNT],
}

macro_rules! binary_ops {
    ($($(#[$doc:meta])* ($single:ident, $double:ident) => $kernel:expr;)*) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
            pub fn $single(&mut self, fj: u64, fk: u64) -> Result<u64, Exception> {
                let (r, flags) = ($kernel)(low_f32(fj), low_f32(fk), F32, self.rounding_mode());
                self.finish(box_f32(r), flags)
            }

            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
            pub fn $double(&mut self, fj: u64, fk: u64) -> Result<u64, Exception> {
                let (r, flags) = ($kernel)(fj, fk, F64, self.rounding_mode());
                self.finish(r, flags)
            }
        )*
    };
}

macro_rules! unary_ops {
    ($($(#[$doc:meta])* ($single:ident, $double:ident) => $kernel:expr;)*) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
            pub fn $single(&mut self, fj: u64) -> Result<u64, Exception> {
                let (r, flags) = ($kernel)(low_f32(fj), F32, self.rounding_mode());
                self.finish(box_f32(r), flags)
            }

            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
            pub fn $double(&mut self, fj: u64) -> Result<u64, Exception> {
                let (r, flags) = ($kernel)(fj, F64, self.rounding_mode());
                self.finish(r, flags)
            }
        )*
    };
}

/// `1 / a`.
fn recip(a: u64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    softfloat::div(one(fmt), a, fmt, rm)
}

/// `1 / sqrt(a)`, rounded after the square root and again after the division.
fn rsqrt(a: u64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    let (root, f1) = softfloat::sqrt(a, fmt, rm);
    let (r, f2) = softfloat::div(one(fmt), root, fmt, rm);
    (r, f1 | f2)
}

/// The encoding of 1.0.
const fn one(fmt: Format) -> u64 {
    fmt.pack(false, fmt.bias() as u64, 0)
}

impl Fpu {
    /// Creates an FPU with `fcsr0` cleared (RNE, no traps, no flags).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw `fcsr0` value.
    pub const fn fcsr(&self) -> u32 {
        self.fcsr0
    }

    /// Current dynamic rounding mode (`fcsr0.RM`).
    pub const fn rounding_mode(&self) -> RoundingMode {
        RoundingMode::from_bits(self.fcsr0 >> FCSR_RM_SHIFT)
    }

    /// Sets `fcsr0.RM`.
    pub fn set_rounding_mode(&mut self, rm: RoundingMode) {
        self.fcsr0 = (self.fcsr0 & !FCSR_RM_MASK) | (rm.bits() << FCSR_RM_SHIFT);
    }

    /// Accumulated (sticky) flags, `fcsr0.Flags`.
    pub const fn flags(&self) -> FpFlags {
        FpFlags::from_bits(self.fcsr0 >> FCSR_FLAGS_SHIFT)
    }

    /// Flags raised by the most recent operation, `fcsr0.Cause`.
    pub const fn cause(&self) -> FpFlags {
        FpFlags::from_bits(self.fcsr0 >> FCSR_CAUSE_SHIFT)
    }

    /// Trap enables, `fcsr0.Enables`.
    pub const fn enables(&self) -> FpFlags {
        FpFlags::from_bits(self.fcsr0)
    }

    /// Sets `fcsr0.Enables`.
    pub fn set_enables(&mut self, enables: FpFlags) {
        self.fcsr0 = (self.fcsr0 & !FCSR_ENABLES_MASK) | u32::from(enables.bits());
    }

    /// Clears the accumulated flags.
    pub fn clear_flags(&mut self) {
        self.fcsr0 &= !FCSR_FLAGS_MASK;
    }

    /// Reads `fcsr0` through one of its four views (`movfcsr2gr`).
    ///
    /// # Errors
    ///
    /// Returns `Exception::IllegalImmediate` for an index above 3.
    pub fn read_fcsr(&self, index: u32) -> Result<u64, Exception> {
        let mask = Self::view(index)?;
        Ok(u64::from(self.fcsr0 & mask))
    }

    /// Writes the bits of `value` selected by view `index` (`movgr2fcsr`).
    ///
    /// Bits outside the view, and undefined bits of `fcsr0`, are preserved.
    ///
    /// # Errors
    ///
    /// Returns `Exception::IllegalImmediate` for an index above 3.
    pub fn write_fcsr(&mut self, index: u32, value: u64) -> Result<(), Exception> {
        let mask = Self::view(index)?;
        self.fcsr0 = (self.fcsr0 & !mask) | (value as u32 & mask);
        tracing::trace!(index, fcsr0 = self.fcsr0, "fcsr write");
        Ok(())
    }

    fn view(index: u32) -> Result<u32, Exception> {
        FCSR_VIEWS.get(index as usize).copied().ok_or_else(|| {
            tracing::warn!(index, "fcsr index out of range");
            Exception::IllegalImmediate { field: "fcsr", value: i64::from(index) }
        })
    }

    /// Reads condition flag `fcc[index]`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalImmediate` for an index of 8 or more.
    pub fn fcc(&self, index: usize) -> Result<bool, Exception> {
        self.fcc.get(index).copied().ok_or_else(|| Self::bad_fcc(index))
    }

    /// Writes condition flag `fcc[index]`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalImmediate` for an index of 8 or more; no flag changes.
    pub fn set_fcc(&mut self, index: usize, value: bool) -> Result<(), Exception> {
        let flag = self.fcc.get_mut(index).ok_or_else(|| Self::bad_fcc(index))?;
        *flag = value;
        Ok(())
    }

    fn bad_fcc(index: usize) -> Exception {
        tracing::warn!(index, count = FCC_COUNT, "fcc index out of range");
        let value = i64::try_from(index).unwrap_or(i64::MAX);
        Exception::IllegalImmediate { field: "fcc", value }
    }

    /// Records the flags of a completed operation.
    ///
    /// `Cause` is replaced by `flags`. If any raised flag is enabled the operation traps
    /// and the sticky flags are left untouched; otherwise the flags accumulate.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when `flags & Enables` is non-empty.
    pub fn finish<T>(&mut self, value: T, flags: FpFlags) -> Result<T, Exception> {
        let bits = u32::from(flags.bits());
        self.fcsr0 = (self.fcsr0 & !FCSR_CAUSE_MASK) | (bits << FCSR_CAUSE_SHIFT);
        if flags.intersects(self.enables()) {
            tracing::debug!(cause = bits, fcsr0 = self.fcsr0, "floating-point trap");
            return Err(Exception::FloatingPoint { cause: flags });
        }
        self.fcsr0 |= bits << FCSR_FLAGS_SHIFT;
        Ok(value)
    }

    binary_ops! {
        /// Addition.
        (fadd_s, fadd_d) => softfloat::add;
        /// Subtraction.
        (fsub_s, fsub_d) => softfloat::sub;
        /// Multiplication.
        (fmul_s, fmul_d) => softfloat::mul;
        /// Division.
        (fdiv_s, fdiv_d) => softfloat::div;
        /// `maxNum`: a NaN operand loses to a number; `+0 > -0`.
        (fmax_s, fmax_d) => |a, b, fmt, _| softfloat::min_max(a, b, true, fmt);
        /// `minNum`: a NaN operand loses to a number; `-0 < +0`.
        (fmin_s, fmin_d) => |a, b, fmt, _| softfloat::min_max(a, b, false, fmt);
        /// Maximum by magnitude, returning the signed operand.
        (fmaxa_s, fmaxa_d) => |a, b, fmt, _| softfloat::min_max_mag(a, b, true, fmt);
        /// Minimum by magnitude, returning the signed operand.
        (fmina_s, fmina_d) => |a, b, fmt, _| softfloat::min_max_mag(a, b, false, fmt);
    }

    unary_ops! {
        /// Square root.
        (fsqrt_s, fsqrt_d) => softfloat::sqrt;
        /// Reciprocal.
        (frecip_s, frecip_d) => recip;
        /// Reciprocal square root.
        (frsqrt_s, frsqrt_d) => rsqrt;
        /// `floor(log2(|a|))`.
        (flogb_s, flogb_d) => softfloat::logb;
    }

    /// Fused multiply-add, single precision.
    ///
    /// # Arguments
    ///
    /// * `op` - Negation flags (`softfloat::MULADD_*`): `fmadd` is 0, `fmsub` negates c,
    ///   `fnmadd` negates the result, `fnmsub` negates c and the result.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn fmuladd_s(&mut self, fj: u64, fk: u64, fa: u64, op: u32) -> Result<u64, Exception> {
        let (r, flags) = softfloat::mul_add(
            low_f32(fj),
            low_f32(fk),
            low_f32(fa),
            op,
            F32,
            self.rounding_mode(),
        );
        self.finish(box_f32(r), flags)
    }

    /// Fused multiply-add, double precision. See [`Fpu::fmuladd_s`].
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn fmuladd_d(&mut self, fj: u64, fk: u64, fa: u64, op: u32) -> Result<u64, Exception> {
        let (r, flags) = softfloat::mul_add(fj, fk, fa, op, F64, self.rounding_mode());
        self.finish(r, flags)
    }

    /// `fj * 2^fk`, single precision; `fk` is read as a 32-bit signed integer.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn fscaleb_s(&mut self, fj: u64, fk: u64) -> Result<u64, Exception> {
        let n = fk as u32 as i32;
        let (r, flags) = softfloat::scalb(low_f32(fj), n, F32, self.rounding_mode());
        self.finish(box_f32(r), flags)
    }

    /// `fj * 2^fk`, double precision; `fk` is a 64-bit signed integer clamped to
    /// `±0x1000`.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn fscaleb_d(&mut self, fj: u64, fk: u64) -> Result<u64, Exception> {
        let n = (fk as i64).clamp(-0x1000, 0x1000) as i32;
        let (r, flags) = softfloat::scalb(fj, n, F64, self.rounding_mode());
        self.finish(r, flags)
    }
}
