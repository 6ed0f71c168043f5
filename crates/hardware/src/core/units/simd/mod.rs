//! Vector/SIMD Unit (LSX and LASX).
//!
//! This module implements the fixed-width vector instruction semantics. A [`VReg`] is a
//! 256-bit byte buffer reinterpreted as lanes of 1/2/4/8/16 bytes; the active width of an
//! operation is [`VecWidth::Lsx`] (128 bits) or [`VecWidth::Lasx`] (256 bits). Lanes above
//! the active width are never touched.
//!
//! The instruction variants are generated by macro from a handful of generic kernels:
//! - [`arith`]: lane-wise average, absolute difference, min/max, multiply-high,
//!   multiply-accumulate and saturating arithmetic.
//! - [`widen`]: horizontal and even/odd widening add, subtract, multiply and
//!   multiply-accumulate.
//!
//! No carry or borrow ever crosses a lane boundary, except that widening ops read two
//! narrow lanes to produce one wide lane occupying the same bytes.

/// Lane-wise (same-width) arithmetic.
pub mod arith;

/// Widening arithmetic.
pub mod widen;

use crate::common::constants::{LASX_BYTES, LSX_BYTES};
use crate::core::units::numeric::LaneInt;

/// Active operand width of a vector operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VecWidth {
    /// 128-bit LSX operation.
    #[default]
    Lsx,
    /// 256-bit LASX operation.
    Lasx,
}

impl VecWidth {
    /// Width in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Lsx => LSX_BYTES,
            Self::Lasx => LASX_BYTES,
        }
    }

    /// Number of lanes of type `T` at this width.
    pub const fn lanes<T: LaneInt>(self) -> usize {
        self.bytes() / T::BYTES
    }
}

/// A 256-bit vector register.
///
/// The low 64 bits alias the scalar floating-point register of the same index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VReg([u8; LASX_BYTES]);

impl VReg {
    /// An all-zero register.
    pub const fn zeroed() -> Self {
        Self([0; LASX_BYTES])
    }

    /// Builds a register from its raw bytes.
    pub const fn from_bytes(bytes: [u8; LASX_BYTES]) -> Self {
        Self(bytes)
    }

    /// Raw little-endian bytes.
    pub const fn as_bytes(&self) -> &[u8; LASX_BYTES] {
        &self.0
    }

    /// Builds a register from leading lanes; remaining bytes are zero.
    ///
    /// # Panics
    ///
    /// Panics if `lanes` holds more than 32 bytes.
    pub fn from_lanes<T: LaneInt>(lanes: &[T]) -> Self {
        let mut reg = Self::zeroed();
        for (i, &v) in lanes.iter().enumerate() {
            reg.set_lane(i, v);
        }
        reg
    }

    /// Reads lane `index` as type `T`.
    ///
    /// # Panics
    ///
    /// Panics if the lane lies outside the 256-bit register.
    #[inline(always)]
    pub fn lane<T: LaneInt>(&self, index: usize) -> T {
        T::load(&self.0[index * T::BYTES..])
    }

    /// Writes lane `index` as type `T`.
    ///
    /// # Panics
    ///
    /// Panics if the lane lies outside the 256-bit register.
    #[inline(always)]
    pub fn set_lane<T: LaneInt>(&mut self, index: usize, value: T) {
        value.store(&mut self.0[index * T::BYTES..]);
    }

    /// The lanes of type `T` within `width`.
    pub fn lanes<T: LaneInt>(&self, width: VecWidth) -> Vec<T> {
        (0..width.lanes::<T>()).map(|i| self.lane(i)).collect()
    }

    /// The low 64 bits (the aliased scalar floating-point register).
    pub fn low_u64(&self) -> u64 {
        self.lane::<u64>(0)
    }

    /// Replaces the low 64 bits, keeping the rest of the register.
    pub fn set_low_u64(&mut self, value: u64) {
        self.set_lane::<u64>(0, value);
    }
}

/// Signature of a three-register vector operation (`vd`, `vj`, `vk`).
pub type VecBinaryOp = fn(&mut VReg, &VReg, &VReg, VecWidth);

/// Signature of a vector operation with a register and an immediate operand.
pub type VecImmOp = fn(&mut VReg, &VReg, i64, VecWidth) -> Result<(), crate::common::error::Exception>;

/// Applies `f` to each pair of same-index lanes.
#[inline]
pub fn map2<T, F>(vd: &mut VReg, vj: &VReg, vk: &VReg, width: VecWidth, f: F)
where
    T: LaneInt,
    F: Fn(T, T) -> T,
{
    for i in 0..width.lanes::<T>() {
        vd.set_lane(i, f(vj.lane(i), vk.lane(i)));
    }
}

/// Applies `f` to the destination lane and each pair of same-index source lanes.
#[inline]
pub fn map3<T, F>(vd: &mut VReg, vj: &VReg, vk: &VReg, width: VecWidth, f: F)
where
    T: LaneInt,
    F: Fn(T, T, T) -> T,
{
    for i in 0..width.lanes::<T>() {
        let acc = vd.lane(i);
        vd.set_lane(i, f(acc, vj.lane(i), vk.lane(i)));
    }
}
