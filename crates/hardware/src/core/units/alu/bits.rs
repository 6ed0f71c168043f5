//! Bit reversal operations.

use crate::core::units::numeric::sext32;

/// Reverses all 32 bits of the low word; the result is sign-extended.
///
/// # Examples
///
/// ```
/// use lasim_core::core::units::alu::bitrev_w;
///
/// assert_eq!(bitrev_w(0x1), 0xffff_ffff_8000_0000);
/// ```
pub const fn bitrev_w(rj: u64) -> u64 {
    sext32((rj as u32).reverse_bits() as u64)
}

/// Reverses all 64 bits.
pub const fn bitrev_d(rj: u64) -> u64 {
    rj.reverse_bits()
}

/// Reverses the bits within each byte of the low word; the result is sign-extended.
pub const fn bitrev_4b(rj: u64) -> u64 {
    sext32(bitrev_bytes(rj))
}

/// Reverses the bits within each of the eight bytes.
pub const fn bitrev_8b(rj: u64) -> u64 {
    bitrev_bytes(rj)
}

/// Reversing every bit and then every byte leaves each byte in place with its bits reversed.
const fn bitrev_bytes(v: u64) -> u64 {
    v.reverse_bits().swap_bytes()
}
