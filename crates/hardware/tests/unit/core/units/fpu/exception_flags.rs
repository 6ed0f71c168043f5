//! `fcsr0` and exception flag tests.

use lasim_core::common::Exception;
use lasim_core::core::units::fpu::exception_flags::FpFlags;
use lasim_core::core::units::fpu::rounding_modes::RoundingMode;
use lasim_core::core::units::fpu::{FCSR0_MASK, Fpu};
use rstest::rstest;

fn d(x: f64) -> u64 {
    x.to_bits()
}

#[test]
fn flag_set_operations() {
    let both = FpFlags::NV | FpFlags::NX;
    assert_eq!(both.bits(), 0x11);
    assert!(both.contains(FpFlags::NX));
    assert!(!both.contains(FpFlags::NV | FpFlags::DZ));
    assert!(both.intersects(FpFlags::NV | FpFlags::DZ));
    assert!(FpFlags::NONE.is_empty());
    assert_eq!(FpFlags::from_bits(0xff), FpFlags::from_bits(0x1f));

    let mut acc = FpFlags::NONE;
    acc |= FpFlags::UF;
    acc |= FpFlags::OF;
    assert_eq!(acc.bits(), 0x6);
}

#[test]
fn cause_is_replaced_while_flags_accumulate() {
    let mut fpu = Fpu::new();
    let _ = fpu.fdiv_d(d(1.0), d(0.0)).unwrap();
    assert_eq!(fpu.cause(), FpFlags::DZ);
    assert_eq!(fpu.flags(), FpFlags::DZ);

    let _ = fpu.fadd_d(d(1.0), d(1.0)).unwrap();
    assert!(fpu.cause().is_empty());
    assert_eq!(fpu.flags(), FpFlags::DZ);

    let _ = fpu.fdiv_d(d(1.0), d(3.0)).unwrap();
    assert_eq!(fpu.flags(), FpFlags::DZ | FpFlags::NX);

    fpu.clear_flags();
    assert!(fpu.flags().is_empty());
    assert_eq!(fpu.cause(), FpFlags::NX);
}

#[test]
fn enabled_flag_traps_and_keeps_the_sticky_flags() {
    let mut fpu = Fpu::new();
    fpu.set_enables(FpFlags::DZ);
    let err = fpu.fdiv_d(d(1.0), d(0.0)).unwrap_err();
    assert_eq!(err, Exception::FloatingPoint { cause: FpFlags::DZ });
    assert_eq!(fpu.cause(), FpFlags::DZ);
    assert!(fpu.flags().is_empty());
}

#[test]
fn disabled_flags_do_not_trap() {
    let mut fpu = Fpu::new();
    fpu.set_enables(FpFlags::OF);
    assert!(fpu.fdiv_d(d(1.0), d(3.0)).is_ok());
    assert_eq!(fpu.enables(), FpFlags::OF);
}

#[test]
fn trap_cause_lists_every_raised_flag() {
    let mut fpu = Fpu::new();
    fpu.set_enables(FpFlags::NX);
    let err = fpu.fmul_d(d(f64::MAX), d(2.0)).unwrap_err();
    assert_eq!(err, Exception::FloatingPoint { cause: FpFlags::OF | FpFlags::NX });
}

#[test]
fn fcsr_views_select_their_fields() {
    let mut fpu = Fpu::new();
    fpu.write_fcsr(0, 0xffff_ffff).unwrap();
    assert_eq!(fpu.fcsr(), FCSR0_MASK);
    assert_eq!(fpu.read_fcsr(0).unwrap(), 0x1f1f_031f);
    assert_eq!(fpu.read_fcsr(1).unwrap(), 0x1f);
    assert_eq!(fpu.read_fcsr(2).unwrap(), 0x1f1f_0000);
    assert_eq!(fpu.read_fcsr(3).unwrap(), 0x300);
}

#[test]
fn partial_view_writes_preserve_other_fields() {
    let mut fpu = Fpu::new();
    fpu.write_fcsr(1, 0x3).unwrap();
    fpu.write_fcsr(3, 0x100).unwrap();
    fpu.write_fcsr(2, 0xffff_ffff).unwrap();
    assert_eq!(fpu.enables(), FpFlags::UF | FpFlags::NX);
    assert_eq!(fpu.rounding_mode(), RoundingMode::Rz);
    assert_eq!(fpu.fcsr(), 0x1f1f_0103);

    fpu.write_fcsr(1, 0).unwrap();
    assert_eq!(fpu.fcsr(), 0x1f1f_0100);
}

#[rstest]
#[case(4)]
#[case(31)]
fn fcsr_index_out_of_range(#[case] index: u32) {
    let mut fpu = Fpu::new();
    let expected = Exception::IllegalImmediate { field: "fcsr", value: i64::from(index) };
    assert_eq!(fpu.read_fcsr(index), Err(expected));
    assert_eq!(fpu.write_fcsr(index, 0), Err(expected));
    assert_eq!(fpu.fcsr(), 0);
}

#[test]
fn condition_flags() {
    let mut fpu = Fpu::new();
    fpu.set_fcc(3, true).unwrap();
    assert_eq!(fpu.fcc(3), Ok(true));
    assert_eq!(fpu.fcc(2), Ok(false));
    fpu.set_fcc(7, true).unwrap();
    assert_eq!(fpu.fcc(7), Ok(true));
    fpu.set_fcc(3, false).unwrap();
    assert_eq!(fpu.fcc(3), Ok(false));
}

#[rstest]
#[case(8)]
#[case(11)]
#[case(usize::MAX)]
fn condition_flag_index_out_of_range(#[case] index: usize) {
    let mut fpu = Fpu::new();
    let expected = Exception::IllegalImmediate {
        field: "fcc",
        value: i64::try_from(index).unwrap_or(i64::MAX),
    };
    assert_eq!(fpu.fcc(index), Err(expected));
    assert_eq!(fpu.set_fcc(index, true), Err(expected));
    // an index of 8 must not alias fcc0
    assert_eq!(fpu.fcc(index % 8), Ok(false));
}
