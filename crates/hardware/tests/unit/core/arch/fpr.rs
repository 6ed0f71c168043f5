//! Vector register file tests.

use lasim_core::core::arch::fpr::VRegFile;
use lasim_core::core::units::simd::VReg;

#[test]
fn scalar_view_aliases_the_low_lane() {
    let mut file = VRegFile::new();
    file.set_vreg(4, VReg::from_lanes::<u64>(&[1, 2, 3, 4]));
    assert_eq!(file.fpr(4), 1);
}

#[test]
fn scalar_write_keeps_the_upper_lanes() {
    let mut file = VRegFile::new();
    file.set_vreg(7, VReg::from_lanes::<u64>(&[1, 2, 3, 4]));
    file.set_fpr(7, 0xaaaa);
    let reg = file.vreg(7);
    assert_eq!(reg.lane::<u64>(0), 0xaaaa);
    assert_eq!(reg.lane::<u64>(1), 2);
    assert_eq!(reg.lane::<u64>(3), 4);
}

#[test]
fn registers_are_independent() {
    let mut file = VRegFile::new();
    file.vreg_mut(0).set_lane::<u8>(31, 0xff);
    assert_eq!(file.vreg(0).lane::<u8>(31), 0xff);
    assert_eq!(*file.vreg(1), VReg::zeroed());
}
