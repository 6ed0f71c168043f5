//! Lane-wise vector arithmetic.
//!
//! Every operation here maps same-index lanes of the sources to the same lane of the
//! destination. The per-width variants (`_b`, `_h`, `_w`, `_d` signed and `_bu` ... `_du`
//! unsigned) are generated from the generic kernels in
//! [`numeric`](crate::core::units::numeric).

use super::{VReg, VecWidth, map2, map3};
use crate::common::error::Exception;
use crate::core::units::numeric::{self, LaneInt};

macro_rules! lanewise {
    ($kernel:expr, $doc:literal: $($name:ident => $t:ty),* $(,)?) => {
        $(
            #[doc = $doc]
            pub fn $name(vd: &mut VReg, vj: &VReg, vk: &VReg, width: VecWidth) {
                map2::<$t, _>(vd, vj, vk, width, $kernel);
            }
        )*
    };
}

macro_rules! accumulate {
    ($kernel:expr, $doc:literal: $($name:ident => $t:ty),* $(,)?) => {
        $(
            #[doc = $doc]
            pub fn $name(vd: &mut VReg, vj: &VReg, vk: &VReg, width: VecWidth) {
                map3::<$t, _>(vd, vj, vk, width, $kernel);
            }
        )*
    };
}

macro_rules! with_imm {
    ($kernel:ident, $doc:literal: $($name:ident => $t:ty),* $(,)?) => {
        $(
            #[doc = $doc]
            ///
            /// # Errors
            ///
            /// Returns `Exception::IllegalImmediate` when `imm` is outside the 5-bit range
            /// (`-16..=15` signed, `0..=31` unsigned).
            pub fn $name(vd: &mut VReg, vj: &VReg, imm: i64, width: VecWidth) -> Result<(), Exception> {
                let imm = check_imm5::<$t>(stringify!($name), imm)?;
                let vk = splat(imm, width);
                map2::<$t, _>(vd, vj, &vk, width, $kernel);
                Ok(())
            }
        )*
    };
}

/// Validates a 5-bit immediate for lane type `T`.
fn check_imm5<T: LaneInt>(field: &'static str, imm: i64) -> Result<T, Exception> {
    let range = if T::SIGNED { -16..=15 } else { 0..=31 };
    if range.contains(&imm) {
        Ok(T::from_imm(imm))
    } else {
        tracing::warn!(field, imm, "vector immediate out of range");
        Err(Exception::IllegalImmediate { field, value: imm })
    }
}

/// A register holding `value` in every lane of `width`.
fn splat<T: LaneInt>(value: T, width: VecWidth) -> VReg {
    let mut reg = VReg::zeroed();
    for i in 0..width.lanes::<T>() {
        reg.set_lane(i, value);
    }
    reg
}

fn vmin_kernel<T: LaneInt>(a: T, b: T) -> T {
    a.min(b)
}

fn vmax_kernel<T: LaneInt>(a: T, b: T) -> T {
    a.max(b)
}

fn madd_kernel<T: LaneInt>(acc: T, a: T, b: T) -> T {
    acc.wrapping_add(a.wrapping_mul(b))
}

fn msub_kernel<T: LaneInt>(acc: T, a: T, b: T) -> T {
    acc.wrapping_sub(a.wrapping_mul(b))
}

lanewise!(numeric::avg, "Average rounded down: `(a >> 1) + (b >> 1) + (a & b & 1)`.":
    vavg_b => i8, vavg_h => i16, vavg_w => i32, vavg_d => i64,
    vavg_bu => u8, vavg_hu => u16, vavg_wu => u32, vavg_du => u64);

lanewise!(numeric::avgr, "Average rounded up: `(a >> 1) + (b >> 1) + ((a | b) & 1)`.":
    vavgr_b => i8, vavgr_h => i16, vavgr_w => i32, vavgr_d => i64,
    vavgr_bu => u8, vavgr_hu => u16, vavgr_wu => u32, vavgr_du => u64);

lanewise!(numeric::absd, "Absolute difference `|a - b|`.":
    vabsd_b => i8, vabsd_h => i16, vabsd_w => i32, vabsd_d => i64,
    vabsd_bu => u8, vabsd_hu => u16, vabsd_wu => u32, vabsd_du => u64);

lanewise!(numeric::adda, "Add-absolute: `|a| + |b|`, wrapping.":
    vadda_b => i8, vadda_h => i16, vadda_w => i32, vadda_d => i64);

lanewise!(numeric::mul_high, "High half of the double-width product.":
    vmuh_b => i8, vmuh_h => i16, vmuh_w => i32, vmuh_d => i64,
    vmuh_bu => u8, vmuh_hu => u16, vmuh_wu => u32, vmuh_du => u64);

lanewise!(numeric::sat_add, "Saturating addition.":
    vsadd_b => i8, vsadd_h => i16, vsadd_w => i32, vsadd_d => i64,
    vsadd_bu => u8, vsadd_hu => u16, vsadd_wu => u32, vsadd_du => u64);

lanewise!(numeric::sat_sub, "Saturating subtraction.":
    vssub_b => i8, vssub_h => i16, vssub_w => i32, vssub_d => i64,
    vssub_bu => u8, vssub_hu => u16, vssub_wu => u32, vssub_du => u64);

lanewise!(vmin_kernel, "Lane-wise minimum.":
    vmin_b => i8, vmin_h => i16, vmin_w => i32, vmin_d => i64,
    vmin_bu => u8, vmin_hu => u16, vmin_wu => u32, vmin_du => u64);

lanewise!(vmax_kernel, "Lane-wise maximum.":
    vmax_b => i8, vmax_h => i16, vmax_w => i32, vmax_d => i64,
    vmax_bu => u8, vmax_hu => u16, vmax_wu => u32, vmax_du => u64);

accumulate!(madd_kernel, "Multiply-accumulate: `d += j * k`, wrapping.":
    vmadd_b => i8, vmadd_h => i16, vmadd_w => i32, vmadd_d => i64);

accumulate!(msub_kernel, "Multiply-subtract: `d -= j * k`, wrapping.":
    vmsub_b => i8, vmsub_h => i16, vmsub_w => i32, vmsub_d => i64);

with_imm!(vmin_kernel, "Minimum against a broadcast 5-bit immediate.":
    vmini_b => i8, vmini_h => i16, vmini_w => i32, vmini_d => i64,
    vmini_bu => u8, vmini_hu => u16, vmini_wu => u32, vmini_du => u64);

with_imm!(vmax_kernel, "Maximum against a broadcast 5-bit immediate.":
    vmaxi_b => i8, vmaxi_h => i16, vmaxi_w => i32, vmaxi_d => i64,
    vmaxi_bu => u8, vmaxi_hu => u16, vmaxi_wu => u32, vmaxi_du => u64);
