//! CRC-32 accumulation.
//!
//! `crc.w.{b,h,w,d}.w` and `crcc.w.{b,h,w,d}.w` fold the low 1/2/4/8 bytes of a message
//! register into a running 32-bit checksum, least significant byte first, using the
//! reflected IEEE (0xEDB88320) and Castagnoli (0x82F63B78) polynomials. No inversion is
//! applied on entry or exit; software does that around the loop. The result is
//! sign-extended from 32 bits.

use crate::common::Exception;
use crate::core::units::numeric::sext32;

/// Reflected IEEE 802.3 polynomial.
pub const CRC32_POLY: u32 = 0xedb8_8320;

/// Reflected Castagnoli polynomial.
pub const CRC32C_POLY: u32 = 0x82f6_3b78;

const fn make_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ poly } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static CRC32_TABLE: [u32; 256] = make_table(CRC32_POLY);
static CRC32C_TABLE: [u32; 256] = make_table(CRC32C_POLY);

fn update(
    table: &[u32; 256],
    field: &'static str,
    val: u64,
    msg: u64,
    size: u32,
) -> Result<u64, Exception> {
    if !matches!(size, 1 | 2 | 4 | 8) {
        tracing::warn!(field, size, "unsupported crc width");
        return Err(Exception::IllegalImmediate { field, value: i64::from(size) });
    }
    let mut crc = val as u32;
    for byte in msg.to_le_bytes().iter().take(size as usize) {
        crc = table[((crc ^ u32::from(*byte)) & 0xff) as usize] ^ (crc >> 8);
    }
    Ok(sext32(u64::from(crc)))
}

/// Folds the low `size` bytes of `msg` into the CRC-32 in `val`.
///
/// # Errors
///
/// Returns `Exception::IllegalImmediate` when `size` is not 1, 2, 4 or 8.
///
/// # Examples
///
/// ```
/// use lasim_core::core::units::alu::crc32;
///
/// // standard "123456789" check value, with the usual inversions applied by the caller
/// let mut crc = u64::from(u32::MAX);
/// for b in b"123456789" {
///     crc = crc32(crc, u64::from(*b), 1).unwrap();
/// }
/// assert_eq!(!(crc as u32), 0xcbf4_3926);
/// ```
pub fn crc32(val: u64, msg: u64, size: u32) -> Result<u64, Exception> {
    update(&CRC32_TABLE, "crc width", val, msg, size)
}

/// Folds the low `size` bytes of `msg` into the CRC-32C in `val`.
///
/// # Errors
///
/// Returns `Exception::IllegalImmediate` when `size` is not 1, 2, 4 or 8.
pub fn crc32c(val: u64, msg: u64, size: u32) -> Result<u64, Exception> {
    update(&CRC32C_TABLE, "crcc width", val, msg, size)
}
