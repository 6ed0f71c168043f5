//! Software IEEE 754 binary32/binary64 arithmetic.
//!
//! Host floating point cannot honour a dynamic rounding mode or report exception flags,
//! so every operation here is computed on integers. It provides:
//! 1. **Formats:** Field layout of binary32 and binary64 ([`Format`]).
//! 2. **Exact Computation:** Operands are unpacked to `(sign, exponent, significand)`
//!    and the result is computed exactly, with a sticky bit where the exact result has
//!    infinitely many bits (division, square root).
//! 3. **Single Rounding:** [`round_pack`] rounds once under any [`RoundingMode`],
//!    detecting tininess after rounding, and packs the result.
//! 4. **Flags:** Every operation returns the raised [`FpFlags`] alongside its result.
//!
//! Values are raw bit patterns in the low `width` bits of a `u64`; bits above the format
//! width are ignored on input and clear on output.

use super::exception_flags::FpFlags;
use super::rounding_modes::RoundingMode;

/// Field layout of an IEEE 754 binary interchange format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Format {
    exp_bits: u32,
    frac_bits: u32,
}

/// binary32 (single precision).
pub const F32: Format = Format { exp_bits: 8, frac_bits: 23 };

/// binary64 (double precision).
pub const F64: Format = Format { exp_bits: 11, frac_bits: 52 };

impl Format {
    /// Total width in bits.
    pub const fn width(self) -> u32 {
        1 + self.exp_bits + self.frac_bits
    }

    /// Mask covering the whole encoding.
    pub const fn mask(self) -> u64 {
        if self.width() == 64 { u64::MAX } else { (1 << self.width()) - 1 }
    }

    /// Significand precision, including the implicit bit.
    pub const fn precision(self) -> u32 {
        self.frac_bits + 1
    }

    /// Exponent bias.
    pub const fn bias(self) -> i32 {
        (1 << (self.exp_bits - 1)) - 1
    }

    /// Unbiased exponent of the smallest normal number.
    pub const fn emin(self) -> i32 {
        1 - self.bias()
    }

    /// All-ones exponent field (infinities and NaNs).
    pub const fn exp_max(self) -> u64 {
        (1 << self.exp_bits) - 1
    }

    /// Mask of the fraction field.
    pub const fn frac_mask(self) -> u64 {
        (1 << self.frac_bits) - 1
    }

    /// The sign bit.
    pub const fn sign_mask(self) -> u64 {
        1 << (self.exp_bits + self.frac_bits)
    }

    /// The quiet bit (most significant fraction bit).
    pub const fn quiet_bit(self) -> u64 {
        1 << (self.frac_bits - 1)
    }

    /// Assembles an encoding from its fields.
    pub const fn pack(self, sign: bool, exp_field: u64, frac: u64) -> u64 {
        let s = if sign { self.sign_mask() } else { 0 };
        s | (exp_field << self.frac_bits) | (frac & self.frac_mask())
    }

    /// The default quiet NaN (`0x7fc00000` / `0x7ff8000000000000`).
    pub const fn default_nan(self) -> u64 {
        self.pack(false, self.exp_max(), self.quiet_bit())
    }

    /// Signed infinity.
    pub const fn inf(self, sign: bool) -> u64 {
        self.pack(sign, self.exp_max(), 0)
    }

    /// Signed zero.
    pub const fn zero(self, sign: bool) -> u64 {
        self.pack(sign, 0, 0)
    }

    /// Largest finite magnitude with the given sign.
    pub const fn max_finite(self, sign: bool) -> u64 {
        self.pack(sign, self.exp_max() - 1, self.frac_mask())
    }

    /// Sign bit of `bits`.
    pub const fn sign(self, bits: u64) -> bool {
        bits & self.sign_mask() != 0
    }

    /// Biased exponent field of `bits`.
    pub const fn exp_field(self, bits: u64) -> u64 {
        (bits >> self.frac_bits) & self.exp_max()
    }

    /// Fraction field of `bits`.
    pub const fn frac(self, bits: u64) -> u64 {
        bits & self.frac_mask()
    }

    /// True for any NaN.
    pub const fn is_nan(self, bits: u64) -> bool {
        self.exp_field(bits) == self.exp_max() && self.frac(bits) != 0
    }

    /// True for a signalling NaN (quiet bit clear).
    pub const fn is_snan(self, bits: u64) -> bool {
        self.is_nan(bits) && bits & self.quiet_bit() == 0
    }

    /// True for either infinity.
    pub const fn is_inf(self, bits: u64) -> bool {
        self.exp_field(bits) == self.exp_max() && self.frac(bits) == 0
    }

    /// True for either zero.
    pub const fn is_zero(self, bits: u64) -> bool {
        bits & self.mask() & !self.sign_mask() == 0
    }

    /// Sets the quiet bit of a NaN, keeping sign and payload.
    pub const fn quiet(self, bits: u64) -> u64 {
        (bits | self.quiet_bit()) & self.mask()
    }

    /// Flips the sign bit.
    pub const fn negate(self, bits: u64) -> u64 {
        (bits ^ self.sign_mask()) & self.mask()
    }

    /// Clears the sign bit.
    pub const fn abs(self, bits: u64) -> u64 {
        bits & self.mask() & !self.sign_mask()
    }
}

/// An operand decoded into its value class.
///
/// Finite values are `sig * 2^exp` with `sig != 0`; subnormals are not normalised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unpacked {
    /// Any NaN.
    Nan,
    /// Signed infinity.
    Inf(bool),
    /// Signed zero.
    Zero(bool),
    /// Nonzero finite value.
    Finite {
        /// Sign (true for negative).
        sign: bool,
        /// Exponent of the significand's least significant bit.
        exp: i32,
        /// Integer significand.
        sig: u128,
    },
}

/// Decodes `bits` in format `fmt`.
pub const fn unpack(bits: u64, fmt: Format) -> Unpacked {
    let bits = bits & fmt.mask();
    let sign = fmt.sign(bits);
    let e = fmt.exp_field(bits);
    let frac = fmt.frac(bits);
    if e == fmt.exp_max() {
        if frac == 0 { Unpacked::Inf(sign) } else { Unpacked::Nan }
    } else if e == 0 {
        if frac == 0 {
            Unpacked::Zero(sign)
        } else {
            Unpacked::Finite { sign, exp: fmt.emin() - fmt.frac_bits as i32, sig: frac as u128 }
        }
    } else {
        Unpacked::Finite {
            sign,
            exp: e as i32 - fmt.bias() - fmt.frac_bits as i32,
            sig: (frac | (1 << fmt.frac_bits)) as u128,
        }
    }
}

/// Shifts right, OR-ing every discarded bit into the result's least significant bit.
const fn shr_jam(x: u128, n: u32) -> u128 {
    if n == 0 {
        x
    } else if n >= 128 {
        (x != 0) as u128
    } else {
        (x >> n) | ((x & ((1 << n) - 1)) != 0) as u128
    }
}

/// Rounds `sig * 2^exp` (plus a sticky fraction) to an integer multiple of `2^lsb_exp`.
///
/// Returns the rounded multiple and whether any nonzero bits were discarded.
fn round_at(
    sign: bool,
    exp: i32,
    sig: u128,
    sticky: bool,
    lsb_exp: i32,
    rm: RoundingMode,
) -> (u128, bool) {
    let shift = lsb_exp - exp;
    let (q, round, rest) = if shift <= 0 {
        (sig << (-shift) as u32, false, sticky)
    } else if shift > 128 {
        (0, false, sig != 0 || sticky)
    } else if shift == 128 {
        (0, sig >> 127 != 0, (sig << 1) != 0 || sticky)
    } else {
        let sh = shift as u32;
        let below = sig & ((1u128 << (sh - 1)) - 1);
        (sig >> sh, (sig >> (sh - 1)) & 1 != 0, below != 0 || sticky)
    };
    let up = rm.round_up(sign, q & 1 != 0, round, rest);
    (q + up as u128, round || rest)
}

/// Rounds the exact value `(-1)^sign * (sig + sticky) * 2^exp` to `fmt` and packs it.
///
/// `sticky` stands for nonzero bits below `sig`'s least significant bit; callers that
/// pass it keep at least `precision + 2` significant bits in `sig`.
///
/// # Returns
///
/// The packed result and the raised flags (OF, UF, NX).
pub fn round_pack(
    sign: bool,
    exp: i32,
    sig: u128,
    sticky: bool,
    fmt: Format,
    rm: RoundingMode,
) -> (u64, FpFlags) {
    let p = fmt.precision() as i32;
    let emin = fmt.emin();

    if sig == 0 {
        if !sticky {
            return (fmt.zero(sign), FpFlags::NONE);
        }
        let up = rm.round_up(sign, false, false, true);
        let bits = if up { fmt.pack(sign, 0, 1) } else { fmt.zero(sign) };
        return (bits, FpFlags::UF | FpFlags::NX);
    }

    let width = 128 - sig.leading_zeros() as i32;
    let e_msb = exp + width - 1;
    let mut lsb_exp = (e_msb - (p - 1)).max(emin - (p - 1));

    let (mut q, inexact) = round_at(sign, exp, sig, sticky, lsb_exp, rm);
    if q >> p != 0 {
        q >>= 1;
        lsb_exp += 1;
    }

    let tiny = if e_msb < emin - 1 {
        true
    } else if e_msb >= emin {
        false
    } else {
        let (unbounded, _) = round_at(sign, exp, sig, sticky, e_msb - (p - 1), rm);
        unbounded >> p == 0
    };

    let mut flags = FpFlags::NONE;
    if inexact {
        flags |= FpFlags::NX;
        if tiny {
            flags |= FpFlags::UF;
        }
    }

    if q >> (p - 1) != 0 {
        let biased = lsb_exp + (p - 1) + fmt.bias();
        if biased >= fmt.exp_max() as i32 {
            let bits = if rm.overflows_to_infinity(sign) {
                fmt.inf(sign)
            } else {
                fmt.max_finite(sign)
            };
            return (bits, FpFlags::OF | FpFlags::NX);
        }
        (fmt.pack(sign, biased as u64, q as u64), flags)
    } else {
        (fmt.pack(sign, 0, q as u64), flags)
    }
}

/// Picks the NaN result for an operation whose operands include a NaN.
///
/// Any signalling operand raises NV. The result is the first signalling operand
/// (quieted), else the first quiet operand, in the order given.
///
/// # Returns
///
/// `None` when no operand is a NaN.
pub fn propagate_nan(operands: &[u64], fmt: Format) -> Option<(u64, FpFlags)> {
    let mut first_snan = None;
    let mut first_qnan = None;
    for &op in operands {
        if fmt.is_snan(op) {
            if first_snan.is_none() {
                first_snan = Some(op);
            }
        } else if fmt.is_nan(op) && first_qnan.is_none() {
            first_qnan = Some(op);
        }
    }
    match (first_snan, first_qnan) {
        (Some(s), _) => Some((fmt.quiet(s), FpFlags::NV)),
        (None, Some(q)) => Some((q & fmt.mask(), FpFlags::NONE)),
        (None, None) => None,
    }
}

/// Default NaN together with the invalid-operation flag.
const fn invalid(fmt: Format) -> (u64, FpFlags) {
    (fmt.default_nan(), FpFlags::NV)
}

/// Shifts a nonzero significand so its MSB sits at bit 125.
const fn align_125(exp: i32, sig: u128) -> (i32, u128) {
    let shift = sig.leading_zeros() as i32 - 2;
    if shift >= 0 {
        (exp - shift, sig << shift as u32)
    } else {
        (exp - shift, shr_jam(sig, (-shift) as u32))
    }
}

/// Exact sum of two nonzero finite values.
///
/// # Returns
///
/// `(sign, exp, sig)` of the sum, or `None` when the sum is exactly zero.
fn add_exact(
    a: (bool, i32, u128),
    b: (bool, i32, u128),
) -> Option<(bool, i32, u128)> {
    let (sa, ea, ma) = a;
    let (sb, eb, mb) = b;
    let (ea, ma) = align_125(ea, ma);
    let (eb, mb) = align_125(eb, mb);

    let ((s_big, e_big, m_big), (s_small, e_small, m_small)) =
        if ea > eb || (ea == eb && ma >= mb) {
            ((sa, ea, ma), (sb, eb, mb))
        } else {
            ((sb, eb, mb), (sa, ea, ma))
        };

    let m_small = shr_jam(m_small, (e_big - e_small) as u32);
    if s_big == s_small {
        Some((s_big, e_big, m_big + m_small))
    } else if m_big == m_small {
        None
    } else {
        Some((s_big, e_big, m_big - m_small))
    }
}

/// Sign of an exact zero sum of operands with signs `sa` and `sb`.
const fn zero_sum_sign(sa: bool, sb: bool, rm: RoundingMode) -> bool {
    if sa == sb { sa } else { matches!(rm, RoundingMode::Rm) }
}

/// `a + b`.
pub fn add(a: u64, b: u64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    if let Some(nan) = propagate_nan(&[a, b], fmt) {
        return nan;
    }
    match (unpack(a, fmt), unpack(b, fmt)) {
        (Unpacked::Inf(sa), Unpacked::Inf(sb)) => {
            if sa == sb { (fmt.inf(sa), FpFlags::NONE) } else { invalid(fmt) }
        }
        (Unpacked::Inf(s), _) | (_, Unpacked::Inf(s)) => (fmt.inf(s), FpFlags::NONE),
        (Unpacked::Zero(sa), Unpacked::Zero(sb)) => {
            (fmt.zero(zero_sum_sign(sa, sb, rm)), FpFlags::NONE)
        }
        (Unpacked::Zero(_), _) => (b & fmt.mask(), FpFlags::NONE),
        (_, Unpacked::Zero(_)) => (a & fmt.mask(), FpFlags::NONE),
        (
            Unpacked::Finite { sign: sa, exp: ea, sig: ma },
            Unpacked::Finite { sign: sb, exp: eb, sig: mb },
        ) => match add_exact((sa, ea, ma), (sb, eb, mb)) {
            Some((s, e, m)) => round_pack(s, e, m, false, fmt, rm),
            None => (fmt.zero(zero_sum_sign(sa, sb, rm)), FpFlags::NONE),
        },
        (Unpacked::Nan, _) | (_, Unpacked::Nan) => invalid(fmt),
    }
}

/// `a - b`.
pub fn sub(a: u64, b: u64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    if let Some(nan) = propagate_nan(&[a, b], fmt) {
        return nan;
    }
    add(a, fmt.negate(b), fmt, rm)
}

/// `a * b`.
pub fn mul(a: u64, b: u64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    if let Some(nan) = propagate_nan(&[a, b], fmt) {
        return nan;
    }
    let sign = fmt.sign(a) != fmt.sign(b);
    match (unpack(a, fmt), unpack(b, fmt)) {
        (Unpacked::Inf(_), Unpacked::Zero(_)) | (Unpacked::Zero(_), Unpacked::Inf(_)) => {
            invalid(fmt)
        }
        (Unpacked::Inf(_), _) | (_, Unpacked::Inf(_)) => (fmt.inf(sign), FpFlags::NONE),
        (Unpacked::Zero(_), _) | (_, Unpacked::Zero(_)) => (fmt.zero(sign), FpFlags::NONE),
        (Unpacked::Finite { exp: ea, sig: ma, .. }, Unpacked::Finite { exp: eb, sig: mb, .. }) => {
            round_pack(sign, ea + eb, ma * mb, false, fmt, rm)
        }
        (Unpacked::Nan, _) | (_, Unpacked::Nan) => invalid(fmt),
    }
}

/// `fmuladd` flag: negate the addend before the addition.
pub const MULADD_NEGATE_C: u32 = 1 << 0;

/// `fmuladd` flag: negate the product before the addition.
pub const MULADD_NEGATE_PRODUCT: u32 = 1 << 1;

/// `fmuladd` flag: negate the exact sum before rounding. Not applied to NaN results.
pub const MULADD_NEGATE_RESULT: u32 = 1 << 2;

/// Fused multiply-add: `±(±(a * b) ± c)` with a single rounding.
///
/// # Arguments
///
/// * `op` - Any combination of the `MULADD_*` negation flags.
pub fn mul_add(a: u64, b: u64, c: u64, op: u32, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    let negate_product = op & MULADD_NEGATE_PRODUCT != 0;
    let negate_c = op & MULADD_NEGATE_C != 0;
    let negate_result = op & MULADD_NEGATE_RESULT != 0;

    let ua = unpack(a, fmt);
    let ub = unpack(b, fmt);
    let inf_times_zero = matches!(
        (ua, ub),
        (Unpacked::Inf(_), Unpacked::Zero(_)) | (Unpacked::Zero(_), Unpacked::Inf(_))
    );

    if let Some((nan, flags)) = propagate_nan(&[c, a, b], fmt) {
        let flags = if inf_times_zero { flags | FpFlags::NV } else { flags };
        return (nan, flags);
    }
    if inf_times_zero {
        return invalid(fmt);
    }

    let ps = (fmt.sign(a) != fmt.sign(b)) != negate_product;
    let cs = fmt.sign(c) != negate_c;
    let uc = unpack(c, fmt);

    let product_inf = matches!(ua, Unpacked::Inf(_)) || matches!(ub, Unpacked::Inf(_));
    if product_inf {
        if matches!(uc, Unpacked::Inf(_)) && cs != ps {
            return invalid(fmt);
        }
        return (fmt.inf(ps != negate_result), FpFlags::NONE);
    }
    if matches!(uc, Unpacked::Inf(_)) {
        return (fmt.inf(cs != negate_result), FpFlags::NONE);
    }

    let product = match (ua, ub) {
        (Unpacked::Finite { exp: ea, sig: ma, .. }, Unpacked::Finite { exp: eb, sig: mb, .. }) => {
            Some((ps, ea + eb, ma * mb))
        }
        _ => None,
    };
    let addend = match uc {
        Unpacked::Finite { exp, sig, .. } => Some((cs, exp, sig)),
        _ => None,
    };

    let exact = match (product, addend) {
        (None, None) => return (fmt.zero(zero_sum_sign(ps, cs, rm) != negate_result), FpFlags::NONE),
        (Some(p), None) => Some(p),
        (None, Some(c)) => Some(c),
        (Some(p), Some(c)) => add_exact(p, c),
    };
    match exact {
        Some((s, e, m)) => round_pack(s != negate_result, e, m, false, fmt, rm),
        None => (fmt.zero(zero_sum_sign(ps, cs, rm) != negate_result), FpFlags::NONE),
    }
}

/// `a / b`.
pub fn div(a: u64, b: u64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    if let Some(nan) = propagate_nan(&[a, b], fmt) {
        return nan;
    }
    let sign = fmt.sign(a) != fmt.sign(b);
    match (unpack(a, fmt), unpack(b, fmt)) {
        (Unpacked::Inf(_), Unpacked::Inf(_)) | (Unpacked::Zero(_), Unpacked::Zero(_)) => {
            invalid(fmt)
        }
        (Unpacked::Inf(_), _) => (fmt.inf(sign), FpFlags::NONE),
        (_, Unpacked::Inf(_)) | (Unpacked::Zero(_), _) => (fmt.zero(sign), FpFlags::NONE),
        (_, Unpacked::Zero(_)) => (fmt.inf(sign), FpFlags::DZ),
        (Unpacked::Finite { exp: ea, sig: ma, .. }, Unpacked::Finite { exp: eb, sig: mb, .. }) => {
            let (ea, na) = align_125(ea, ma);
            let shift_b = mb.leading_zeros() as i32 - 64;
            let (eb, db) = (eb - shift_b, mb << shift_b as u32);
            let q = na / db;
            let rem = na % db;
            round_pack(sign, ea - eb, q, rem != 0, fmt, rm)
        }
        (Unpacked::Nan, _) | (_, Unpacked::Nan) => invalid(fmt),
    }
}

/// Integer square root with remainder.
const fn isqrt(n: u128) -> (u128, u128) {
    let mut x = n;
    let mut res: u128 = 0;
    let mut bit: u128 = 1 << 126;
    while bit > n {
        bit >>= 2;
    }
    while bit != 0 {
        if x >= res + bit {
            x -= res + bit;
            res = (res >> 1) + bit;
        } else {
            res >>= 1;
        }
        bit >>= 2;
    }
    (res, x)
}

/// Square root.
pub fn sqrt(a: u64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    if let Some(nan) = propagate_nan(&[a], fmt) {
        return nan;
    }
    match unpack(a, fmt) {
        Unpacked::Zero(_) => (a & fmt.mask(), FpFlags::NONE),
        Unpacked::Inf(false) => (fmt.inf(false), FpFlags::NONE),
        Unpacked::Inf(true) | Unpacked::Finite { sign: true, .. } | Unpacked::Nan => invalid(fmt),
        Unpacked::Finite { sign: false, exp, sig } => {
            let mut shift = sig.leading_zeros() as i32 - 2;
            if (exp - shift) & 1 != 0 {
                shift += 1;
            }
            let (root, rem) = isqrt(sig << shift as u32);
            round_pack(false, (exp - shift) / 2, root, rem != 0, fmt, rm)
        }
    }
}

/// `a * 2^n`, rounded once.
pub fn scalb(a: u64, n: i32, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    if let Some(nan) = propagate_nan(&[a], fmt) {
        return nan;
    }
    match unpack(a, fmt) {
        Unpacked::Finite { sign, exp, sig } => {
            round_pack(sign, exp + n.clamp(-0x1000, 0x1000), sig, false, fmt, rm)
        }
        _ => (a & fmt.mask(), FpFlags::NONE),
    }
}

/// `floor(log2(|a|))` as a floating-point value.
///
/// Negative nonzero inputs are invalid; zeros return `-inf` with DZ.
pub fn logb(a: u64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    if let Some(nan) = propagate_nan(&[a], fmt) {
        return nan;
    }
    match unpack(a, fmt) {
        Unpacked::Zero(_) => (fmt.inf(true), FpFlags::DZ),
        Unpacked::Inf(false) => (fmt.inf(false), FpFlags::NONE),
        Unpacked::Inf(true) | Unpacked::Finite { sign: true, .. } | Unpacked::Nan => invalid(fmt),
        Unpacked::Finite { sign: false, exp, sig } => {
            let e_msb = exp + 127 - sig.leading_zeros() as i32;
            from_int(i64::from(e_msb), fmt, rm)
        }
    }
}

/// Converts a signed integer to floating point.
pub fn from_int(value: i64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    round_pack(value < 0, 0, u128::from(value.unsigned_abs()), false, fmt, rm)
}

/// Converts to a signed integer of `bits` width (32 or 64), rounding with `rm`.
///
/// NaN converts to 0 and out-of-range values saturate; both raise NV only.
///
/// # Returns
///
/// The integer result sign-extended to 64 bits, and the raised flags.
pub fn to_int(a: u64, bits: u32, fmt: Format, rm: RoundingMode) -> (i64, FpFlags) {
    let max = (1i128 << (bits - 1)) - 1;
    let min = -(1i128 << (bits - 1));
    let saturate = |sign: bool| ((if sign { min } else { max }) as i64, FpFlags::NV);

    match unpack(a, fmt) {
        Unpacked::Nan => (0, FpFlags::NV),
        Unpacked::Inf(sign) => saturate(sign),
        Unpacked::Zero(_) => (0, FpFlags::NONE),
        Unpacked::Finite { sign, exp, sig } => {
            let (magnitude, inexact) = if exp >= 0 {
                if exp >= 64 {
                    return saturate(sign);
                }
                (sig << exp as u32, false)
            } else {
                round_at(sign, exp, sig, false, 0, rm)
            };
            let value = if sign { -(magnitude as i128) } else { magnitude as i128 };
            if value > max || value < min {
                return saturate(sign);
            }
            (value as i64, if inexact { FpFlags::NX } else { FpFlags::NONE })
        }
    }
}

/// Rounds to an integral value in the same format. Raises NX when the value changes.
pub fn round_to_int(a: u64, fmt: Format, rm: RoundingMode) -> (u64, FpFlags) {
    if let Some(nan) = propagate_nan(&[a], fmt) {
        return nan;
    }
    match unpack(a, fmt) {
        Unpacked::Finite { sign, exp, sig } if exp < 0 => {
            let (q, inexact) = round_at(sign, exp, sig, false, 0, rm);
            let flags = if inexact { FpFlags::NX } else { FpFlags::NONE };
            let (bits, _) = round_pack(sign, 0, q, false, fmt, rm);
            (bits, flags)
        }
        _ => (a & fmt.mask(), FpFlags::NONE),
    }
}

/// Converts between formats, rounding with `rm` when narrowing.
///
/// NaN payloads are carried across (truncated or zero-extended) and quieted.
pub fn convert(a: u64, from: Format, to: Format, rm: RoundingMode) -> (u64, FpFlags) {
    match unpack(a, from) {
        Unpacked::Nan => {
            let flags = if from.is_snan(a) { FpFlags::NV } else { FpFlags::NONE };
            let payload = from.frac(a);
            let payload = if to.frac_bits >= from.frac_bits {
                payload << (to.frac_bits - from.frac_bits)
            } else {
                payload >> (from.frac_bits - to.frac_bits)
            };
            let bits = to.pack(from.sign(a), to.exp_max(), payload) | to.quiet_bit();
            (bits, flags)
        }
        Unpacked::Inf(sign) => (to.inf(sign), FpFlags::NONE),
        Unpacked::Zero(sign) => (to.zero(sign), FpFlags::NONE),
        Unpacked::Finite { sign, exp, sig } => round_pack(sign, exp, sig, false, to, rm),
    }
}

/// Result of comparing two values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `a < b`.
    Less,
    /// `a == b` (including `-0 == +0`).
    Equal,
    /// `a > b`.
    Greater,
    /// At least one operand is NaN.
    Unordered,
}

/// Signed-magnitude key ordering every non-NaN value; both zeros map to 0.
const fn order_key(bits: u64, fmt: Format) -> i128 {
    let magnitude = fmt.abs(bits) as i128;
    if fmt.sign(bits) { -magnitude } else { magnitude }
}

/// Compares `a` with `b`. Raises no flags; signalling behaviour is the caller's choice.
pub const fn compare(a: u64, b: u64, fmt: Format) -> Relation {
    if fmt.is_nan(a) || fmt.is_nan(b) {
        return Relation::Unordered;
    }
    let (ka, kb) = (order_key(a, fmt), order_key(b, fmt));
    if ka < kb {
        Relation::Less
    } else if ka > kb {
        Relation::Greater
    } else {
        Relation::Equal
    }
}

/// Shared NaN handling for the min/max family.
///
/// A NaN is returned only when both operands are NaN; sNaN raises NV either way.
fn min_max_nan(a: u64, b: u64, fmt: Format) -> Option<(u64, FpFlags)> {
    let flags = if fmt.is_snan(a) || fmt.is_snan(b) { FpFlags::NV } else { FpFlags::NONE };
    match (fmt.is_nan(a), fmt.is_nan(b)) {
        (true, true) => propagate_nan(&[a, b], fmt),
        (true, false) => Some((b & fmt.mask(), flags)),
        (false, true) => Some((a & fmt.mask(), flags)),
        (false, false) => None,
    }
}

/// IEEE 754-2008 `minNum`/`maxNum` with `-0 < +0`.
pub fn min_max(a: u64, b: u64, is_max: bool, fmt: Format) -> (u64, FpFlags) {
    if let Some(r) = min_max_nan(a, b, fmt) {
        return r;
    }
    let (a, b) = (a & fmt.mask(), b & fmt.mask());
    let (ka, kb) = (total_key(a, fmt), total_key(b, fmt));
    let pick_a = if is_max { ka >= kb } else { ka <= kb };
    (if pick_a { a } else { b }, FpFlags::NONE)
}

/// Like [`min_max`] but ordered by magnitude; equal magnitudes fall back to the
/// algebraic order.
pub fn min_max_mag(a: u64, b: u64, is_max: bool, fmt: Format) -> (u64, FpFlags) {
    if let Some(r) = min_max_nan(a, b, fmt) {
        return r;
    }
    let (a, b) = (a & fmt.mask(), b & fmt.mask());
    let (ma, mb) = (fmt.abs(a), fmt.abs(b));
    if ma == mb {
        return min_max(a, b, is_max, fmt);
    }
    let pick_a = if is_max { ma > mb } else { ma < mb };
    (if pick_a { a } else { b }, FpFlags::NONE)
}

/// Key ordering every non-NaN value with `-0` strictly below `+0`.
const fn total_key(bits: u64, fmt: Format) -> i128 {
    let magnitude = fmt.abs(bits) as i128;
    if fmt.sign(bits) { -magnitude - 1 } else { magnitude }
}

/// `fclass` bit for signalling NaN.
pub const CLASS_SNAN: u32 = 1 << 0;
/// `fclass` bit for quiet NaN.
pub const CLASS_QNAN: u32 = 1 << 1;
/// `fclass` bit for negative infinity.
pub const CLASS_NEG_INF: u32 = 1 << 2;
/// `fclass` bit for negative normal.
pub const CLASS_NEG_NORMAL: u32 = 1 << 3;
/// `fclass` bit for negative subnormal.
pub const CLASS_NEG_SUBNORMAL: u32 = 1 << 4;
/// `fclass` bit for negative zero.
pub const CLASS_NEG_ZERO: u32 = 1 << 5;
/// `fclass` bit for positive infinity.
pub const CLASS_POS_INF: u32 = 1 << 6;
/// `fclass` bit for positive normal.
pub const CLASS_POS_NORMAL: u32 = 1 << 7;
/// `fclass` bit for positive subnormal.
pub const CLASS_POS_SUBNORMAL: u32 = 1 << 8;
/// `fclass` bit for positive zero.
pub const CLASS_POS_ZERO: u32 = 1 << 9;

/// Classifies `a`; exactly one bit of the result is set.
pub const fn classify(a: u64, fmt: Format) -> u32 {
    let sign = fmt.sign(a);
    let e = fmt.exp_field(a);
    let frac = fmt.frac(a);
    if e == fmt.exp_max() {
        if frac == 0 {
            if sign { CLASS_NEG_INF } else { CLASS_POS_INF }
        } else if a & fmt.quiet_bit() != 0 {
            CLASS_QNAN
        } else {
            CLASS_SNAN
        }
    } else if e == 0 {
        match (frac == 0, sign) {
            (true, true) => CLASS_NEG_ZERO,
            (true, false) => CLASS_POS_ZERO,
            (false, true) => CLASS_NEG_SUBNORMAL,
            (false, false) => CLASS_POS_SUBNORMAL,
        }
    } else if sign {
        CLASS_NEG_NORMAL
    } else {
        CLASS_POS_NORMAL
    }
}
