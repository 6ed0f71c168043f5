//! Address type tests.

use lasim_core::common::constants::PALEN;
use lasim_core::common::{PhysAddr, VirtAddr};
use rstest::rstest;

#[rstest]
#[case(12, 0x1234_5678, 0x678, 0x12345)]
#[case(14, 0x1234_5678, 0x1678, 0x48d1)]
#[case(21, 0x4012_3456, 0x12_3456, 0x200)]
fn page_offset_and_number(
    #[case] shift: u8,
    #[case] va: u64,
    #[case] offset: u64,
    #[case] number: u64,
) {
    let va = VirtAddr::new(va);
    assert_eq!(va.page_offset(shift), offset);
    assert_eq!(va.page_number(shift), number);
}

#[test]
fn physical_address_is_truncated_to_palen() {
    let pa = PhysAddr::new(u64::MAX);
    assert_eq!(pa.val(), (1 << PALEN) - 1);
    assert_eq!(PhysAddr::new(0x9000_0000_0001_0000).val(), 0x1_0000);
}

#[test]
fn virtual_address_keeps_every_bit() {
    assert_eq!(VirtAddr::new(u64::MAX).val(), u64::MAX);
}

#[test]
fn display_formats() {
    assert_eq!(VirtAddr::new(0x1000).to_string(), "va:0x0000000000001000");
    assert_eq!(PhysAddr::new(0x1000).to_string(), "pa:0x000000001000");
}
