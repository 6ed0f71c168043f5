//! Widening vector arithmetic.
//!
//! Each destination lane `D.w[i]` is computed from two narrow source lanes taken at
//! positions `2i + oj` of `vj` and `2i + ok` of `vk`, widened before the operation so no
//! intermediate result is lost:
//!
//! | family            | `oj` | `ok` | result                         |
//! |-------------------|------|------|--------------------------------|
//! | `vhaddw`/`vhsubw` | 1    | 0    | `J.n[2i+1] ± K.n[2i]`          |
//! | `v*wev`           | 0    | 0    | `J.n[2i] op K.n[2i]`           |
//! | `v*wod`           | 1    | 1    | `J.n[2i+1] op K.n[2i+1]`       |
//!
//! Mixed-sign forms (`_bu_b`, ...) zero-extend `vj` and sign-extend `vk` into a signed
//! wide lane. The multiply-accumulate forms add the widened product to `D.w[i]`.

use super::{VReg, VecWidth};
use crate::core::units::numeric::LaneInt;

/// Even-lane selector.
const EV: usize = 0;
/// Odd-lane selector.
const OD: usize = 1;

/// Widening binary kernel.
#[inline]
pub fn widen2<NJ, NK, W, F>(
    vd: &mut VReg,
    vj: &VReg,
    vk: &VReg,
    width: VecWidth,
    (oj, ok): (usize, usize),
    f: F,
) where
    NJ: LaneInt,
    NK: LaneInt,
    W: LaneInt + From<NJ> + From<NK>,
    F: Fn(W, W) -> W,
{
    for i in 0..width.lanes::<W>() {
        let a = <W as From<NJ>>::from(vj.lane::<NJ>(2 * i + oj));
        let b = <W as From<NK>>::from(vk.lane::<NK>(2 * i + ok));
        vd.set_lane(i, f(a, b));
    }
}

/// Widening multiply-accumulate kernel: `D.w[i] += widen(J) * widen(K)`.
#[inline]
pub fn widen_madd<NJ, NK, W>(vd: &mut VReg, vj: &VReg, vk: &VReg, width: VecWidth, odd: usize)
where
    NJ: LaneInt,
    NK: LaneInt,
    W: LaneInt + From<NJ> + From<NK>,
{
    for i in 0..width.lanes::<W>() {
        let a = <W as From<NJ>>::from(vj.lane::<NJ>(2 * i + odd));
        let b = <W as From<NK>>::from(vk.lane::<NK>(2 * i + odd));
        let acc: W = vd.lane(i);
        vd.set_lane(i, acc.wrapping_add(a.wrapping_mul(b)));
    }
}

fn add<W: LaneInt>(a: W, b: W) -> W {
    a.wrapping_add(b)
}

fn sub<W: LaneInt>(a: W, b: W) -> W {
    a.wrapping_sub(b)
}

fn mul<W: LaneInt>(a: W, b: W) -> W {
    a.wrapping_mul(b)
}

macro_rules! widening {
    ($kernel:ident, $sel:expr, $doc:literal: $($name:ident => ($nj:ty, $nk:ty) -> $w:ty),* $(,)?) => {
        $(
            #[doc = $doc]
            pub fn $name(vd: &mut VReg, vj: &VReg, vk: &VReg, width: VecWidth) {
                widen2::<$nj, $nk, $w, _>(vd, vj, vk, width, $sel, $kernel);
            }
        )*
    };
}

macro_rules! widening_madd {
    ($odd:expr, $doc:literal: $($name:ident => ($nj:ty, $nk:ty) -> $w:ty),* $(,)?) => {
        $(
            #[doc = $doc]
            pub fn $name(vd: &mut VReg, vj: &VReg, vk: &VReg, width: VecWidth) {
                widen_madd::<$nj, $nk, $w>(vd, vj, vk, width, $odd);
            }
        )*
    };
}

widening!(add, (OD, EV), "Horizontal widening add: `D.w[i] = J.n[2i+1] + K.n[2i]`.":
    vhaddw_h_b => (i8, i8) -> i16, vhaddw_w_h => (i16, i16) -> i32,
    vhaddw_d_w => (i32, i32) -> i64, vhaddw_q_d => (i64, i64) -> i128,
    vhaddw_hu_bu => (u8, u8) -> u16, vhaddw_wu_hu => (u16, u16) -> u32,
    vhaddw_du_wu => (u32, u32) -> u64, vhaddw_qu_du => (u64, u64) -> u128);

widening!(sub, (OD, EV), "Horizontal widening subtract: `D.w[i] = J.n[2i+1] - K.n[2i]`.":
    vhsubw_h_b => (i8, i8) -> i16, vhsubw_w_h => (i16, i16) -> i32,
    vhsubw_d_w => (i32, i32) -> i64, vhsubw_q_d => (i64, i64) -> i128,
    vhsubw_hu_bu => (u8, u8) -> u16, vhsubw_wu_hu => (u16, u16) -> u32,
    vhsubw_du_wu => (u32, u32) -> u64, vhsubw_qu_du => (u64, u64) -> u128);

widening!(add, (EV, EV), "Widening add of even lanes.":
    vaddwev_h_b => (i8, i8) -> i16, vaddwev_w_h => (i16, i16) -> i32,
    vaddwev_d_w => (i32, i32) -> i64, vaddwev_q_d => (i64, i64) -> i128,
    vaddwev_h_bu => (u8, u8) -> u16, vaddwev_w_hu => (u16, u16) -> u32,
    vaddwev_d_wu => (u32, u32) -> u64, vaddwev_q_du => (u64, u64) -> u128,
    vaddwev_h_bu_b => (u8, i8) -> i16, vaddwev_w_hu_h => (u16, i16) -> i32,
    vaddwev_d_wu_w => (u32, i32) -> i64, vaddwev_q_du_d => (u64, i64) -> i128);

widening!(add, (OD, OD), "Widening add of odd lanes.":
    vaddwod_h_b => (i8, i8) -> i16, vaddwod_w_h => (i16, i16) -> i32,
    vaddwod_d_w => (i32, i32) -> i64, vaddwod_q_d => (i64, i64) -> i128,
    vaddwod_h_bu => (u8, u8) -> u16, vaddwod_w_hu => (u16, u16) -> u32,
    vaddwod_d_wu => (u32, u32) -> u64, vaddwod_q_du => (u64, u64) -> u128,
    vaddwod_h_bu_b => (u8, i8) -> i16, vaddwod_w_hu_h => (u16, i16) -> i32,
    vaddwod_d_wu_w => (u32, i32) -> i64, vaddwod_q_du_d => (u64, i64) -> i128);

widening!(sub, (EV, EV), "Widening subtract of even lanes.":
    vsubwev_h_b => (i8, i8) -> i16, vsubwev_w_h => (i16, i16) -> i32,
    vsubwev_d_w => (i32, i32) -> i64, vsubwev_q_d => (i64, i64) -> i128,
    vsubwev_h_bu => (u8, u8) -> u16, vsubwev_w_hu => (u16, u16) -> u32,
    vsubwev_d_wu => (u32, u32) -> u64, vsubwev_q_du => (u64, u64) -> u128);

widening!(sub, (OD, OD), "Widening subtract of odd lanes.":
    vsubwod_h_b => (i8, i8) -> i16, vsubwod_w_h => (i16, i16) -> i32,
    vsubwod_d_w => (i32, i32) -> i64, vsubwod_q_d => (i64, i64) -> i128,
    vsubwod_h_bu => (u8, u8) -> u16, vsubwod_w_hu => (u16, u16) -> u32,
    vsubwod_d_wu => (u32, u32) -> u64, vsubwod_q_du => (u64, u64) -> u128);

widening!(mul, (EV, EV), "Widening multiply of even lanes (exact product).":
    vmulwev_h_b => (i8, i8) -> i16, vmulwev_w_h => (i16, i16) -> i32,
    vmulwev_d_w => (i32, i32) -> i64, vmulwev_q_d => (i64, i64) -> i128,
    vmulwev_h_bu => (u8, u8) -> u16, vmulwev_w_hu => (u16, u16) -> u32,
    vmulwev_d_wu => (u32, u32) -> u64, vmulwev_q_du => (u64, u64) -> u128,
    vmulwev_h_bu_b => (u8, i8) -> i16, vmulwev_w_hu_h => (u16, i16) -> i32,
    vmulwev_d_wu_w => (u32, i32) -> i64, vmulwev_q_du_d => (u64, i64) -> i128);

widening!(mul, (OD, OD), "Widening multiply of odd lanes (exact product).":
    vmulwod_h_b => (i8, i8) -> i16, vmulwod_w_h => (i16, i16) -> i32,
    vmulwod_d_w => (i32, i32) -> i64, vmulwod_q_d => (i64, i64) -> i128,
    vmulwod_h_bu => (u8, u8) -> u16, vmulwod_w_hu => (u16, u16) -> u32,
    vmulwod_d_wu => (u32, u32) -> u64, vmulwod_q_du => (u64, u64) -> u128,
    vmulwod_h_bu_b => (u8, i8) -> i16, vmulwod_w_hu_h => (u16, i16) -> i32,
    vmulwod_d_wu_w => (u32, i32) -> i64, vmulwod_q_du_d => (u64, i64) -> i128);

widening_madd!(EV, "Widening multiply-accumulate of even lanes.":
    vmaddwev_h_b => (i8, i8) -> i16, vmaddwev_w_h => (i16, i16) -> i32,
    vmaddwev_d_w => (i32, i32) -> i64, vmaddwev_q_d => (i64, i64) -> i128,
    vmaddwev_h_bu => (u8, u8) -> u16, vmaddwev_w_hu => (u16, u16) -> u32,
    vmaddwev_d_wu => (u32, u32) -> u64, vmaddwev_q_du => (u64, u64) -> u128,
    vmaddwev_h_bu_b => (u8, i8) -> i16, vmaddwev_w_hu_h => (u16, i16) -> i32,
    vmaddwev_d_wu_w => (u32, i32) -> i64, vmaddwev_q_du_d => (u64, i64) -> i128);

widening_madd!(OD, "Widening multiply-accumulate of odd lanes.":
    vmaddwod_h_b => (i8, i8) -> i16, vmaddwod_w_h => (i16, i16) -> i32,
    vmaddwod_d_w => (i32, i32) -> i64, vmaddwod_q_d => (i64, i64) -> i128,
    vmaddwod_h_bu => (u8, u8) -> u16, vmaddwod_w_hu => (u16, u16) -> u32,
    vmaddwod_d_wu => (u32, u32) -> u64, vmaddwod_q_du => (u64, u64) -> u128,
    vmaddwod_h_bu_b => (u8, i8) -> i16, vmaddwod_w_hu_h => (u16, i16) -> i32,
    vmaddwod_d_wu_w => (u32, i32) -> i64, vmaddwod_q_du_d => (u64, i64) -> i128);
