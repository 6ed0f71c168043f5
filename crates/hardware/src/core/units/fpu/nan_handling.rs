//! NaN boxing and default NaNs for the FPU.
//!
//! LoongArch keeps single-precision values in the low half of a 64-bit floating-point
//! register:
//!
//! - **Boxing** ([`box_f32`]): Results written by single-precision operations have the
//!   upper 32 bits set, so the register reads as a NaN when viewed as a double.
//! - **Reading** ([`low_f32`]): Single-precision operands are taken from the low 32 bits.
//!   The upper half is ignored, so an improperly boxed operand is used as-is.
//! - **Default NaNs** ([`DEFAULT_NAN_F32`], [`DEFAULT_NAN_F64`]): The result of an invalid
//!   operation that has no NaN operand to propagate.

/// Default quiet NaN for single precision (positive, quiet, zero payload).
pub const DEFAULT_NAN_F32: u32 = 0x7fc0_0000;

/// Default quiet NaN for double precision (positive, quiet, zero payload).
pub const DEFAULT_NAN_F64: u64 = 0x7ff8_0000_0000_0000;

/// Upper-32-bit mask set on boxed single-precision values.
pub const NAN_BOX_MASK: u64 = 0xFFFF_FFFF_0000_0000;

/// Boxes a single-precision bit pattern into a 64-bit register value.
///
/// # Arguments
///
/// * `bits` - The binary32 encoding in the low 32 bits; higher bits are discarded.
///
/// # Returns
///
/// The encoding with the upper 32 bits set.
#[inline]
pub const fn box_f32(bits: u64) -> u64 {
    (bits & 0xFFFF_FFFF) | NAN_BOX_MASK
}

/// Returns the single-precision operand held in a 64-bit register value.
#[inline]
pub const fn low_f32(val: u64) -> u64 {
    val & 0xFFFF_FFFF
}

/// True when the upper 32 bits of `val` are all ones.
#[inline]
pub const fn is_boxed(val: u64) -> bool {
    val & NAN_BOX_MASK == NAN_BOX_MASK
}
