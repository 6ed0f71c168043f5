//! Bound-check assertions.
//!
//! Both compare unsigned 64-bit values and report the checked address (`rj`) in `BADV`.

use crate::common::Exception;

/// `asrtle.d`: asserts `rj <= rk`.
///
/// # Errors
///
/// Returns `Exception::BoundCheck(rj)` when `rj > rk`.
pub const fn asrtle_d(rj: u64, rk: u64) -> Result<(), Exception> {
    if rj > rk { Err(Exception::BoundCheck(rj)) } else { Ok(()) }
}

/// `asrtgt.d`: asserts `rj > rk`.
///
/// # Errors
///
/// Returns `Exception::BoundCheck(rj)` when `rj <= rk`.
pub const fn asrtgt_d(rj: u64, rk: u64) -> Result<(), Exception> {
    if rj <= rk { Err(Exception::BoundCheck(rj)) } else { Ok(()) }
}
