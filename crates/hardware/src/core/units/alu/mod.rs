//! Integer Helper Unit.
//!
//! This module implements the integer instructions that translated code calls out for
//! instead of expanding inline. Operations are organized into submodules by category:
//! - [`bits`]:   `bitrev.w`, `bitrev.d`, `bitrev.4b`, `bitrev.8b`
//! - [`crc`]:    `crc.w.*.w` and `crcc.w.*.w`
//! - [`bounds`]: `asrtle.d`, `asrtgt.d`
//!
//! Results destined for a 64-bit register are returned already sign-extended where the
//! instruction produces a 32-bit value.

/// Bit reversal.
pub mod bits;

/// Bound-check assertions.
pub mod bounds;

/// CRC-32 and CRC-32C accumulation.
pub mod crc;

pub use self::bits::{bitrev_4b, bitrev_8b, bitrev_d, bitrev_w};
pub use self::bounds::{asrtgt_d, asrtle_d};
pub use self::crc::{crc32, crc32c};
