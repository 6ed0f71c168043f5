//! Floating-point conversions.
//!
//! Covers precision changes (`fcvt`), integer to float (`ffint`), float to integer with a
//! static or dynamic rounding mode (`ftint`), and round-to-integral (`frint`).
//!
//! Float-to-integer results are always 64-bit register values: 32-bit results are
//! sign-extended. A NaN converts to 0 and an out-of-range value saturates; both raise
//! invalid without inexact.

use super::Fpu;
use super::nan_handling::{box_f32, low_f32};
use super::rounding_modes::RoundingMode;
use super::softfloat::{self, F32, F64};
use crate::common::error::Exception;

macro_rules! ftint_ops {
    ($($name:ident: $fmt:ident -> $bits:literal, $mode:expr, $doc:literal;)*) => {
        $(
            #[doc = $doc]
            ///
            /// # Errors
            ///
            /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
            pub fn $name(&mut self, fj: u64) -> Result<u64, Exception> {
                let mode: Option<RoundingMode> = $mode;
                let rm = mode.unwrap_or_else(|| self.rounding_mode());
                let (value, flags) = softfloat::to_int(fj & $fmt.mask(), $bits, $fmt, rm);
                self.finish(value as u64, flags)
            }
        )*
    };
}

impl Fpu {
    /// Widens single to double precision (exact).
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn fcvt_d_s(&mut self, fj: u64) -> Result<u64, Exception> {
        let (r, flags) = softfloat::convert(low_f32(fj), F32, F64, self.rounding_mode());
        self.finish(r, flags)
    }

    /// Narrows double to single precision, rounding with `fcsr0.RM`.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn fcvt_s_d(&mut self, fj: u64) -> Result<u64, Exception> {
        let (r, flags) = softfloat::convert(fj, F64, F32, self.rounding_mode());
        self.finish(box_f32(r), flags)
    }

    /// Converts a 32-bit signed integer (low half of `fj`) to single precision.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn ffint_s_w(&mut self, fj: u64) -> Result<u64, Exception> {
        let v = i64::from(fj as u32 as i32);
        let (r, flags) = softfloat::from_int(v, F32, self.rounding_mode());
        self.finish(box_f32(r), flags)
    }

    /// Converts a 64-bit signed integer to single precision.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn ffint_s_l(&mut self, fj: u64) -> Result<u64, Exception> {
        let (r, flags) = softfloat::from_int(fj as i64, F32, self.rounding_mode());
        self.finish(box_f32(r), flags)
    }

    /// Converts a 32-bit signed integer to double precision (exact).
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn ffint_d_w(&mut self, fj: u64) -> Result<u64, Exception> {
        let v = i64::from(fj as u32 as i32);
        let (r, flags) = softfloat::from_int(v, F64, self.rounding_mode());
        self.finish(r, flags)
    }

    /// Converts a 64-bit signed integer to double precision.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn ffint_d_l(&mut self, fj: u64) -> Result<u64, Exception> {
        let (r, flags) = softfloat::from_int(fj as i64, F64, self.rounding_mode());
        self.finish(r, flags)
    }

    /// Rounds a single-precision value to an integral value with `fcsr0.RM`.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn frint_s(&mut self, fj: u64) -> Result<u64, Exception> {
        let (r, flags) = softfloat::round_to_int(low_f32(fj), F32, self.rounding_mode());
        self.finish(box_f32(r), flags)
    }

    /// Rounds a double-precision value to an integral value with `fcsr0.RM`.
    ///
    /// # Errors
    ///
    /// Returns `Exception::FloatingPoint` when a raised flag is enabled.
    pub fn frint_d(&mut self, fj: u64) -> Result<u64, Exception> {
        let (r, flags) = softfloat::round_to_int(fj, F64, self.rounding_mode());
        self.finish(r, flags)
    }

    ftint_ops! {
        ftintrm_l_s: F32 -> 64, Some(RoundingMode::Rm), "Single to 64-bit integer, rounding toward −∞.";
        ftintrm_l_d: F64 -> 64, Some(RoundingMode::Rm), "Double to 64-bit integer, rounding toward −∞.";
        ftintrm_w_s: F32 -> 32, Some(RoundingMode::Rm), "Single to 32-bit integer, rounding toward −∞.";
        ftintrm_w_d: F64 -> 32, Some(RoundingMode::Rm), "Double to 32-bit integer, rounding toward −∞.";
        ftintrp_l_s: F32 -> 64, Some(RoundingMode::Rp), "Single to 64-bit integer, rounding toward +∞.";
        ftintrp_l_d: F64 -> 64, Some(RoundingMode::Rp), "Double to 64-bit integer, rounding toward +∞.";
        ftintrp_w_s: F32 -> 32, Some(RoundingMode::Rp), "Single to 32-bit integer, rounding toward +∞.";
        ftintrp_w_d: F64 -> 32, Some(RoundingMode::Rp), "Double to 32-bit integer, rounding toward +∞.";
        ftintrz_l_s: F32 -> 64, Some(RoundingMode::Rz), "Single to 64-bit integer, truncating.";
        ftintrz_l_d: F64 -> 64, Some(RoundingMode::Rz), "Double to 64-bit integer, truncating.";
        ftintrz_w_s: F32 -> 32, Some(RoundingMode::Rz), "Single to 32-bit integer, truncating.";
        ftintrz_w_d: F64 -> 32, Some(RoundingMode::Rz), "Double to 32-bit integer, truncating.";
        ftintrne_l_s: F32 -> 64, Some(RoundingMode::Rne), "Single to 64-bit integer, nearest-even.";
        ftintrne_l_d: F64 -> 64, Some(RoundingMode::Rne), "Double to 64-bit integer, nearest-even.";
        ftintrne_w_s: F32 -> 32, Some(RoundingMode::Rne), "Single to 32-bit integer, nearest-even.";
        ftintrne_w_d: F64 -> 32, Some(RoundingMode::Rne), "Double to 32-bit integer, nearest-even.";
        ftint_l_s: F32 -> 64, None, "Single to 64-bit integer with `fcsr0.RM`.";
        ftint_l_d: F64 -> 64, None, "Double to 64-bit integer with `fcsr0.RM`.";
        ftint_w_s: F32 -> 32, None, "Single to 32-bit integer with `fcsr0.RM`.";
        ftint_w_d: F64 -> 32, None, "Double to 32-bit integer with `fcsr0.RM`.";
    }
}
