//! CSR file tests.
//!
//! Verifies the static CSR table, the reset state and write-mask enforcement.

use lasim_core::core::arch::csr::{
    self, CSR_TABLE, Csrs, asid, crmd, csr_info, tlbrera,
};

#[test]
fn table_is_sorted_and_unique() {
    assert!(CSR_TABLE.windows(2).all(|w| w[0].num < w[1].num));
}

#[test]
fn lookup_by_number() {
    assert_eq!(csr_info(csr::CRMD).map(|c| c.name), Some("crmd"));
    assert_eq!(csr_info(csr::DMW0 + 3).map(|c| c.name), Some("dmw3"));
    assert!(csr_info(0x9).is_none());
    assert!(csr_info(0x7ff).is_none());
}

#[test]
fn reset_state() {
    let csrs = Csrs::new(64, 3);
    assert_eq!(csrs.get(csr::CRMD), crmd::DA);
    assert_eq!(csrs.get(csr::CPUID), 3);
    assert_eq!(csrs.get(csr::ASID) >> asid::ASIDBITS_SHIFT, 10);
    assert_eq!((csrs.get(csr::PRCFG3) >> 4) & 0xff, 63);
    assert_eq!(csrs.get(csr::ESTAT), 0);
}

#[test]
fn write_applies_the_mask_and_returns_the_old_value() {
    let mut csrs = Csrs::new(64, 0);
    assert_eq!(csrs.write(csr::CRMD, u64::MAX), Some(crmd::DA));
    assert_eq!(csrs.get(csr::CRMD), 0x3ff);
}

#[test]
fn read_only_registers_ignore_writes() {
    let mut csrs = Csrs::new(64, 5);
    assert_eq!(csrs.write(csr::CPUID, 0x1ff), Some(5));
    assert_eq!(csrs.get(csr::CPUID), 5);
    let _ = csrs.write(csr::BADI, 0xdead);
    assert_eq!(csrs.get(csr::BADI), 0);
}

#[test]
fn eentry_keeps_page_alignment() {
    let mut csrs = Csrs::new(64, 0);
    let _ = csrs.write(csr::EENTRY, 0x1c00_0abc);
    assert_eq!(csrs.get(csr::EENTRY), 0x1c00_0000);
}

#[test]
fn tlbrera_write_keeps_bit_one_clear() {
    let mut csrs = Csrs::new(64, 0);
    let _ = csrs.write(csr::TLBRERA, 0x1003);
    assert_eq!(csrs.get(csr::TLBRERA), 0x1000 | tlbrera::IS_TLBR);
}

#[test]
fn unknown_csr_is_absent() {
    let mut csrs = Csrs::new(64, 0);
    assert_eq!(csrs.read(0x9), None);
    assert_eq!(csrs.write(0x9, 1), None);
    assert_eq!(csrs.get(0x9), 0);
    csrs.set(0x9, 1);
    assert_eq!(csrs.read(0x9), None);
}

#[test]
fn set_bypasses_the_write_mask() {
    let mut csrs = Csrs::new(64, 0);
    csrs.set(csr::BADI, 0x1234);
    assert_eq!(csrs.get(csr::BADI), 0x1234);
    csrs.set_bits(csr::CRMD, crmd::PLV_MASK, 3);
    assert_eq!(csrs.get(csr::CRMD), crmd::DA | 3);
}

#[test]
fn iter_visits_every_register() {
    let csrs = Csrs::new(16, 0);
    assert_eq!(csrs.iter().count(), CSR_TABLE.len());
    let (info, value) = csrs.iter().next().unwrap();
    assert_eq!(info.name, "crmd");
    assert_eq!(value, crmd::DA);
}
