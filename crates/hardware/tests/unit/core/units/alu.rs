//! Scalar ALU tests.

use lasim_core::common::Exception;
use lasim_core::core::units::alu::crc::{CRC32_POLY, CRC32C_POLY};
use lasim_core::core::units::alu::{
    asrtgt_d, asrtle_d, bitrev_4b, bitrev_8b, bitrev_d, bitrev_w, crc32, crc32c,
};
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn bitrev_w_sign_extends() {
    assert_eq!(bitrev_w(0x1), 0xffff_ffff_8000_0000);
    assert_eq!(bitrev_w(0x8000_0000), 0x1);
    assert_eq!(bitrev_w(0xffff_ffff_0000_0002), 0x4000_0000);
}

#[test]
fn bitrev_d_reverses_all_bits() {
    assert_eq!(bitrev_d(0x1), 0x8000_0000_0000_0000);
    assert_eq!(bitrev_d(0x0000_0000_0000_00f0), 0x0f00_0000_0000_0000);
}

#[test]
fn bitrev_per_byte() {
    assert_eq!(bitrev_8b(0x0102_0408_1020_4080), 0x8040_2010_0804_0201);
    assert_eq!(bitrev_4b(0xffff_ffff_0000_0001), 0x80);
    assert_eq!(bitrev_4b(0x01), 0x80);
    assert_eq!(bitrev_4b(0x0100_0000), 0xffff_ffff_8000_0000);
}

proptest! {
    #[test]
    fn per_byte_reversal_is_full_reversal_with_bytes_swapped(x in any::<u64>()) {
        prop_assert_eq!(bitrev_8b(x).swap_bytes(), bitrev_d(x));
    }

    #[test]
    fn bitrev_d_is_an_involution(x in any::<u64>()) {
        prop_assert_eq!(bitrev_d(bitrev_d(x)), x);
    }

    #[test]
    fn exactly_one_bound_assertion_passes(a in any::<u64>(), b in any::<u64>()) {
        prop_assert_ne!(asrtle_d(a, b).is_ok(), asrtgt_d(a, b).is_ok());
    }
}

#[rstest]
#[case(1, 2, true)]
#[case(2, 2, true)]
#[case(3, 2, false)]
#[case(u64::MAX, 0, false)]
fn asrtle_compares_unsigned(#[case] rj: u64, #[case] rk: u64, #[case] ok: bool) {
    match asrtle_d(rj, rk) {
        Ok(()) => assert!(ok),
        Err(e) => {
            assert!(!ok);
            assert_eq!(e, Exception::BoundCheck(rj));
        }
    }
}

#[test]
fn asrtgt_reports_the_checked_register() {
    assert_eq!(asrtgt_d(2, 2), Err(Exception::BoundCheck(2)));
    assert_eq!(asrtgt_d(3, 2), Ok(()));
    assert_eq!(asrtgt_d(0, u64::MAX), Err(Exception::BoundCheck(0)));
}

#[test]
fn crc32_check_value_bytewise() {
    let mut crc = u64::from(u32::MAX);
    for b in b"123456789" {
        crc = crc32(crc, u64::from(*b), 1).unwrap();
    }
    assert_eq!(!(crc as u32), 0xcbf4_3926);
}

#[test]
fn crc32_check_value_with_wide_chunks() {
    let crc = crc32(u64::from(u32::MAX), u64::from_le_bytes(*b"12345678"), 8).unwrap();
    let crc = crc32(crc, u64::from(b'9'), 1).unwrap();
    assert_eq!(!(crc as u32), 0xcbf4_3926);

    let crc = crc32(u64::from(u32::MAX), u64::from(u32::from_le_bytes(*b"1234")), 4).unwrap();
    let crc = crc32(crc, u64::from(u16::from_le_bytes(*b"56")), 2).unwrap();
    let crc = crc32(crc, u64::from(u16::from_le_bytes(*b"78")), 2).unwrap();
    let crc = crc32(crc, u64::from(b'9'), 1).unwrap();
    assert_eq!(!(crc as u32), 0xcbf4_3926);
}

#[test]
fn crc32c_check_value() {
    let mut crc = u64::from(u32::MAX);
    for b in b"123456789" {
        crc = crc32c(crc, u64::from(*b), 1).unwrap();
    }
    assert_eq!(!(crc as u32), 0xe306_9283);
}

#[test]
fn crc_ignores_bytes_above_the_width() {
    let narrow = crc32(0, 0x42, 1).unwrap();
    let noisy = crc32(0, 0xffff_ff42, 1).unwrap();
    assert_eq!(narrow, noisy);
}

#[test]
fn crc_single_bit_folds_the_polynomial() {
    // a lone 0x80 byte shifts the seed bit out on the last step
    let crc = crc32(0, 0x80, 1).unwrap();
    assert_eq!(crc as u32, CRC32_POLY);
    let crc = crc32c(0, 0x80, 1).unwrap();
    assert_eq!(crc as u32, CRC32C_POLY);
}

#[test]
fn crc_result_is_sign_extended() {
    let crc = crc32(0, 0x80, 1).unwrap();
    assert_eq!(crc, 0xffff_ffff_edb8_8320);
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(16)]
fn crc_rejects_other_widths(#[case] size: u32) {
    assert_eq!(
        crc32(0, 0, size),
        Err(Exception::IllegalImmediate { field: "crc width", value: i64::from(size) })
    );
    assert_eq!(
        crc32c(0, 0, size),
        Err(Exception::IllegalImmediate { field: "crcc width", value: i64::from(size) })
    );
}
