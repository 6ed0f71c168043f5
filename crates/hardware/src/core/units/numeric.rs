//! Width-Parameterised Integer Primitives.
//!
//! This module implements the lane arithmetic shared by the vector engine and the scalar
//! helpers. It provides:
//! 1. **Lane Abstraction:** The [`LaneInt`] trait over every 8/16/32/64/128-bit integer,
//!    signed and unsigned, including little-endian load/store into register bytes.
//! 2. **Saturating and Wrapping Arithmetic:** Clamping add/sub and two's-complement ops.
//! 3. **Averages and Distances:** Floor/round-up averages, absolute difference and
//!    add-absolute, all computed without intermediate overflow.
//! 4. **Multiply-High:** The upper half of the exact double-width product.
//!
//! Every function here is pure and total: no input panics or traps.

use std::fmt::Debug;

/// An integer type usable as a vector lane.
pub trait LaneInt: Copy + Eq + Ord + Debug + Default + Send + Sync + 'static {
    /// Lane width in bytes.
    const BYTES: usize;
    /// Lane width in bits.
    const BITS: u32;
    /// True for signed lane types.
    const SIGNED: bool;
    /// Smallest representable value.
    const MIN: Self;
    /// Largest representable value.
    const MAX: Self;
    /// The value zero.
    const ZERO: Self;
    /// The value one.
    const ONE: Self;

    /// Reads a lane from the first `BYTES` bytes of `bytes` (little-endian).
    fn load(bytes: &[u8]) -> Self;
    /// Writes the lane into the first `BYTES` bytes of `out` (little-endian).
    fn store(self, out: &mut [u8]);
    /// Truncating conversion from a sign-extended 64-bit immediate.
    fn from_imm(imm: i64) -> Self;

    /// Two's-complement addition.
    fn wrapping_add(self, rhs: Self) -> Self;
    /// Two's-complement subtraction.
    fn wrapping_sub(self, rhs: Self) -> Self;
    /// Two's-complement multiplication (low half of the product).
    fn wrapping_mul(self, rhs: Self) -> Self;
    /// Two's-complement negation.
    fn wrapping_neg(self) -> Self;
    /// Addition clamped to `[MIN, MAX]`.
    fn saturating_add(self, rhs: Self) -> Self;
    /// Subtraction clamped to `[MIN, MAX]`.
    fn saturating_sub(self, rhs: Self) -> Self;
    /// Shift right by one (arithmetic for signed lanes).
    fn half(self) -> Self;
    /// Bitwise and.
    fn and(self, rhs: Self) -> Self;
    /// Bitwise or.
    fn or(self, rhs: Self) -> Self;
    /// Upper half of the exact double-width product.
    fn mul_high(self, rhs: Self) -> Self;
}

/// Upper 128 bits of the full 256-bit unsigned product.
const fn mul_high_u128(a: u128, b: u128) -> u128 {
    const MASK: u128 = u64::MAX as u128;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let lo_lo = a_lo * b_lo;
    let hi_lo = a_hi * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_hi = a_hi * b_hi;

    let cross = (lo_lo >> 64) + (hi_lo & MASK) + (lo_hi & MASK);
    hi_hi + (hi_lo >> 64) + (lo_hi >> 64) + (cross >> 64)
}

/// Upper 128 bits of the full 256-bit signed product.
const fn mul_high_i128(a: i128, b: i128) -> i128 {
    let mut hi = mul_high_u128(a as u128, b as u128);
    if a < 0 {
        hi = hi.wrapping_sub(b as u128);
    }
    if b < 0 {
        hi = hi.wrapping_sub(a as u128);
    }
    hi as i128
}

macro_rules! impl_lane_int {
    ($t:ty, $signed:expr, $wide:ty) => {
        impl LaneInt for $t {
            const BYTES: usize = std::mem::size_of::<$t>();
            const BITS: u32 = <$t>::BITS;
            const SIGNED: bool = $signed;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline(always)]
            fn load(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(&bytes[..Self::BYTES]);
                <$t>::from_le_bytes(raw)
            }

            #[inline(always)]
            fn store(self, out: &mut [u8]) {
                out[..Self::BYTES].copy_from_slice(&self.to_le_bytes());
            }

            #[inline(always)]
            fn from_imm(imm: i64) -> Self {
                imm as $t
            }

            #[inline(always)]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$t>::wrapping_add(self, rhs)
            }

            #[inline(always)]
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$t>::wrapping_sub(self, rhs)
            }

            #[inline(always)]
            fn wrapping_mul(self, rhs: Self) -> Self {
                <$t>::wrapping_mul(self, rhs)
            }

            #[inline(always)]
            fn wrapping_neg(self) -> Self {
                <$t>::wrapping_neg(self)
            }

            #[inline(always)]
            fn saturating_add(self, rhs: Self) -> Self {
                <$t>::saturating_add(self, rhs)
            }

            #[inline(always)]
            fn saturating_sub(self, rhs: Self) -> Self {
                <$t>::saturating_sub(self, rhs)
            }

            #[inline(always)]
            fn half(self) -> Self {
                self >> 1
            }

            #[inline(always)]
            fn and(self, rhs: Self) -> Self {
                self & rhs
            }

            #[inline(always)]
            fn or(self, rhs: Self) -> Self {
                self | rhs
            }

            #[inline(always)]
            fn mul_high(self, rhs: Self) -> Self {
                ((self as $wide * rhs as $wide) >> <$t>::BITS) as $t
            }
        }
    };
}

impl_lane_int!(i8, true, i16);
impl_lane_int!(i16, true, i32);
impl_lane_int!(i32, true, i64);
impl_lane_int!(i64, true, i128);
impl_lane_int!(u8, false, u16);
impl_lane_int!(u16, false, u32);
impl_lane_int!(u32, false, u64);
impl_lane_int!(u64, false, u128);

macro_rules! impl_lane_int_128 {
    ($t:ty, $signed:expr, $mulh:path) => {
        impl LaneInt for $t {
            const BYTES: usize = 16;
            const BITS: u32 = 128;
            const SIGNED: bool = $signed;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline(always)]
            fn load(bytes: &[u8]) -> Self {
                let mut raw = [0u8; 16];
                raw.copy_from_slice(&bytes[..16]);
                <$t>::from_le_bytes(raw)
            }

            #[inline(always)]
            fn store(self, out: &mut [u8]) {
                out[..16].copy_from_slice(&self.to_le_bytes());
            }

            #[inline(always)]
            fn from_imm(imm: i64) -> Self {
                imm as $t
            }

            fn wrapping_add(self, rhs: Self) -> Self {
                <$t>::wrapping_add(self, rhs)
            }

            fn wrapping_sub(self, rhs: Self) -> Self {
                <$t>::wrapping_sub(self, rhs)
            }

            fn wrapping_mul(self, rhs: Self) -> Self {
                <$t>::wrapping_mul(self, rhs)
            }

            fn wrapping_neg(self) -> Self {
                <$t>::wrapping_neg(self)
            }

            fn saturating_add(self, rhs: Self) -> Self {
                <$t>::saturating_add(self, rhs)
            }

            fn saturating_sub(self, rhs: Self) -> Self {
                <$t>::saturating_sub(self, rhs)
            }

            fn half(self) -> Self {
                self >> 1
            }

            fn and(self, rhs: Self) -> Self {
                self & rhs
            }

            fn or(self, rhs: Self) -> Self {
                self | rhs
            }

            fn mul_high(self, rhs: Self) -> Self {
                $mulh(self, rhs)
            }
        }
    };
}

impl_lane_int_128!(i128, true, mul_high_i128);
impl_lane_int_128!(u128, false, mul_high_u128);

/// Saturating addition: the exact sum clamped to the lane range.
#[inline]
pub fn sat_add<T: LaneInt>(a: T, b: T) -> T {
    a.saturating_add(b)
}

/// Saturating subtraction: the exact difference clamped to the lane range.
#[inline]
pub fn sat_sub<T: LaneInt>(a: T, b: T) -> T {
    a.saturating_sub(b)
}

/// Average rounded toward negative infinity: `floor((a + b) / 2)`.
///
/// Computed as `(a >> 1) + (b >> 1) + (a & b & 1)` so the intermediate never overflows.
///
/// # Examples
///
/// ```
/// use lasim_core::core::units::numeric::avg;
///
/// assert_eq!(avg(0xFF_u8, 0x00), 0x7F);
/// assert_eq!(avg(-3_i8, 0), -2);
/// ```
#[inline]
pub fn avg<T: LaneInt>(a: T, b: T) -> T {
    a.half()
        .wrapping_add(b.half())
        .wrapping_add(a.and(b).and(T::ONE))
}

/// Average rounded toward positive infinity: `floor((a + b + 1) / 2)`.
///
/// # Examples
///
/// ```
/// use lasim_core::core::units::numeric::avgr;
///
/// assert_eq!(avgr(0xFF_u8, 0x00), 0x80);
/// ```
#[inline]
pub fn avgr<T: LaneInt>(a: T, b: T) -> T {
    a.half()
        .wrapping_add(b.half())
        .wrapping_add(a.or(b).and(T::ONE))
}

/// Absolute difference `|a - b|`.
///
/// The subtraction is ordered so the true magnitude is produced; for signed lanes
/// whose distance exceeds `MAX` the result is that magnitude's unsigned bit pattern.
#[inline]
pub fn absd<T: LaneInt>(a: T, b: T) -> T {
    if a > b { a.wrapping_sub(b) } else { b.wrapping_sub(a) }
}

/// Two's-complement absolute value (`MIN` maps to itself).
#[inline]
pub fn wrapping_abs<T: LaneInt>(a: T) -> T {
    if a < T::ZERO { a.wrapping_neg() } else { a }
}

/// Add-absolute: `|a| + |b|` with wrapping.
#[inline]
pub fn adda<T: LaneInt>(a: T, b: T) -> T {
    wrapping_abs(a).wrapping_add(wrapping_abs(b))
}

/// Upper half of the exact double-width product `a * b`.
#[inline]
pub fn mul_high<T: LaneInt>(a: T, b: T) -> T {
    a.mul_high(b)
}

/// Widens a narrow lane value into a wider lane type.
///
/// Signed sources sign-extend and unsigned sources zero-extend, because the
/// conversion goes through the `From` impl of the source type.
#[inline(always)]
pub fn widen<N, W>(value: N) -> W
where
    N: LaneInt,
    W: LaneInt + From<N>,
{
    W::from(value)
}

/// Sign-extends the low 32 bits of `value` to 64 bits.
#[inline(always)]
pub const fn sext32(value: u64) -> u64 {
    value as u32 as i32 as i64 as u64
}
