//! Fused multiply-add tests.

use lasim_core::core::units::fpu::Fpu;
use lasim_core::core::units::fpu::exception_flags::FpFlags;
use lasim_core::core::units::fpu::rounding_modes::RoundingMode;
use lasim_core::core::units::fpu::softfloat::{
    MULADD_NEGATE_C, MULADD_NEGATE_PRODUCT, MULADD_NEGATE_RESULT,
};
use proptest::prelude::*;
use rstest::rstest;

const FMADD: u32 = 0;
const FMSUB: u32 = MULADD_NEGATE_C;
const FNMADD: u32 = MULADD_NEGATE_RESULT;
const FNMSUB: u32 = MULADD_NEGATE_C | MULADD_NEGATE_RESULT;

fn d(x: f64) -> u64 {
    x.to_bits()
}

fn tiny() -> f64 {
    1.0 / (1u64 << 60) as f64
}

fn fpu_with(rm: RoundingMode) -> Fpu {
    let mut fpu = Fpu::new();
    fpu.set_rounding_mode(rm);
    fpu
}

proptest! {
    #[test]
    fn matches_host_fused_multiply_add(a in any::<f64>(), b in any::<f64>(), c in any::<f64>()) {
        let r = Fpu::new().fmuladd_d(d(a), d(b), d(c), FMADD).unwrap();
        let host = a.mul_add(b, c);
        if host.is_nan() {
            prop_assert!(f64::from_bits(r).is_nan());
        } else {
            prop_assert_eq!(r, host.to_bits(), "fma({:e}, {:e}, {:e})", a, b, c);
        }
    }

    #[test]
    fn single_matches_host_fused_multiply_add(a in any::<f32>(), b in any::<f32>(), c in any::<f32>()) {
        let boxed = |x: f32| u64::from(x.to_bits()) | 0xffff_ffff_0000_0000;
        let r = Fpu::new().fmuladd_s(boxed(a), boxed(b), boxed(c), FMADD).unwrap();
        let host = a.mul_add(b, c);
        if !host.is_nan() {
            prop_assert_eq!(r as u32, host.to_bits());
        }
    }
}

#[test]
fn single_rounding_is_visible() {
    // 0.1 * 10 - 1 is 2^-54 exactly when the product is not rounded first
    let r = Fpu::new().fmuladd_d(d(0.1), d(10.0), d(1.0), FMSUB).unwrap();
    assert_eq!(f64::from_bits(r), 2f64.powi(-54));
}

#[rstest]
#[case(RoundingMode::Rne, 1.0f64.to_bits())]
#[case(RoundingMode::Rz, 1.0f64.to_bits())]
#[case(RoundingMode::Rm, 1.0f64.to_bits())]
#[case(RoundingMode::Rp, 0x3ff0_0000_0000_0001)]
fn tiny_positive_addend(#[case] rm: RoundingMode, #[case] expected: u64) {
    let mut fpu = fpu_with(rm);
    assert_eq!(fpu.fmuladd_d(d(1.0), d(1.0), d(tiny()), FMADD).unwrap(), expected);
    assert_eq!(fpu.cause(), FpFlags::NX);
}

#[rstest]
#[case(RoundingMode::Rne, 1.0f64.to_bits())]
#[case(RoundingMode::Rp, 1.0f64.to_bits())]
#[case(RoundingMode::Rz, 0x3fef_ffff_ffff_ffff)]
#[case(RoundingMode::Rm, 0x3fef_ffff_ffff_ffff)]
fn tiny_negative_addend(#[case] rm: RoundingMode, #[case] expected: u64) {
    let mut fpu = fpu_with(rm);
    assert_eq!(fpu.fmuladd_d(d(1.0), d(1.0), d(-tiny()), FMADD).unwrap(), expected);
}

#[rstest]
#[case(FMADD, 7.0)]
#[case(FMSUB, 5.0)]
#[case(FNMADD, -7.0)]
#[case(FNMSUB, -5.0)]
#[case(MULADD_NEGATE_PRODUCT, -5.0)]
fn negation_forms(#[case] op: u32, #[case] expected: f64) {
    let r = Fpu::new().fmuladd_d(d(2.0), d(3.0), d(1.0), op).unwrap();
    assert_eq!(f64::from_bits(r), expected);
}

#[test]
fn negated_exact_zero_is_negative() {
    let r = Fpu::new().fmuladd_d(d(1.0), d(1.0), d(-1.0), FNMADD).unwrap();
    assert_eq!(r, d(-0.0));
    let r = Fpu::new().fmuladd_d(d(1.0), d(1.0), d(-1.0), FMADD).unwrap();
    assert_eq!(r, d(0.0));
    let r = fpu_with(RoundingMode::Rm).fmuladd_d(d(1.0), d(1.0), d(-1.0), FMADD).unwrap();
    assert_eq!(r, d(-0.0));
}

#[test]
fn infinity_times_zero_is_invalid_even_with_a_quiet_nan_addend() {
    let qnan = 0x7ff8_0000_0000_1234;
    let mut fpu = Fpu::new();
    let r = fpu.fmuladd_d(d(f64::INFINITY), d(0.0), qnan, FMADD).unwrap();
    assert_eq!(r, qnan);
    assert_eq!(fpu.cause(), FpFlags::NV);
}

#[test]
fn infinity_times_zero_without_nan_gives_the_default_nan() {
    let mut fpu = Fpu::new();
    let r = fpu.fmuladd_d(d(0.0), d(f64::INFINITY), d(1.0), FMADD).unwrap();
    assert_eq!(r, 0x7ff8_0000_0000_0000);
    assert_eq!(fpu.cause(), FpFlags::NV);
}

#[test]
fn opposite_infinities_are_invalid() {
    let mut fpu = Fpu::new();
    let r = fpu.fmuladd_d(d(f64::INFINITY), d(1.0), d(f64::NEG_INFINITY), FMADD).unwrap();
    assert!(f64::from_bits(r).is_nan());
    assert_eq!(fpu.cause(), FpFlags::NV);
}

#[test]
fn single_precision_is_boxed() {
    let boxed = |x: f32| u64::from(x.to_bits()) | 0xffff_ffff_0000_0000;
    let r = Fpu::new().fmuladd_s(boxed(2.0), boxed(3.0), boxed(1.0), FNMSUB).unwrap();
    assert_eq!(r, boxed(-5.0));
}
