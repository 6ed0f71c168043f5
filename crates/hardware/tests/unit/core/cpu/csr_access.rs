//! CSR instruction tests.

use lasim_core::common::Exception;
use lasim_core::core::arch::csr::{self, asid, crmd, estat, tlbrera};
use lasim_core::core::arch::mode::PrivilegeLevel;
use pretty_assertions::assert_eq;

use crate::common::harness::{enter_plv, kernel_cpu};

#[test]
fn csr_access_is_privileged() {
    let mut cpu = kernel_cpu();
    enter_plv(&mut cpu, PrivilegeLevel::Plv3);
    assert_eq!(cpu.csr_read(csr::CRMD), Err(Exception::InstructionPrivilege));
    assert_eq!(cpu.csr_write(csr::SAVE0, 1), Err(Exception::InstructionPrivilege));
    assert_eq!(cpu.csr_xchg(csr::SAVE0, 1, 1), Err(Exception::InstructionPrivilege));
}

#[test]
fn unimplemented_csr_does_not_exist() {
    let mut cpu = kernel_cpu();
    assert_eq!(cpu.csr_read(0x9), Err(Exception::InstructionNotExist(0x9)));
    assert_eq!(cpu.csr_write(0x9, 0), Err(Exception::InstructionNotExist(0x9)));
}

#[test]
fn write_returns_the_previous_value() {
    let mut cpu = kernel_cpu();
    assert_eq!(cpu.csr_write(csr::SAVE0, 5), Ok(0));
    assert_eq!(cpu.csr_write(csr::SAVE0, 6), Ok(5));
    assert_eq!(cpu.csr_read(csr::SAVE0), Ok(6));
}

#[test]
fn xchg_replaces_only_masked_bits() {
    let mut cpu = kernel_cpu();
    let _ = cpu.csr_write(csr::SAVE0 + 1, 0xff00).unwrap();
    assert_eq!(cpu.csr_xchg(csr::SAVE0 + 1, 0x0f0f, 0xff), Ok(0xff00));
    assert_eq!(cpu.csr_read(csr::SAVE0 + 1), Ok(0xff0f));
}

#[test]
fn xchg_respects_the_write_mask() {
    let mut cpu = kernel_cpu();
    let _ = cpu.csr_xchg(csr::CRMD, u64::MAX, crmd::IE).unwrap();
    assert_eq!(cpu.csr_read(csr::CRMD), Ok(crmd::DA | crmd::IE));
}

#[test]
fn estat_accepts_only_software_interrupts() {
    let mut cpu = kernel_cpu();
    let _ = cpu.csr_write(csr::ESTAT, u64::MAX).unwrap();
    assert_eq!(cpu.csr_read(csr::ESTAT), Ok(estat::IS_SW_MASK));
}

#[test]
fn asid_write_keeps_the_width_field() {
    let mut cpu = kernel_cpu();
    let _ = cpu.csr_write(csr::ASID, 0xffff).unwrap();
    assert_eq!(cpu.asid(), 0x3ff);
    let raw = cpu.csr_read(csr::ASID).unwrap();
    assert_eq!((raw >> asid::ASIDBITS_SHIFT) & 0xff, 10);
}

#[test]
fn pgd_follows_badv() {
    let mut cpu = kernel_cpu();
    let _ = cpu.csr_write(csr::PGDL, 0x10_0000).unwrap();
    let _ = cpu.csr_write(csr::PGDH, 0x20_0000).unwrap();

    let _ = cpu.csr_write(csr::BADV, 0x1234).unwrap();
    assert_eq!(cpu.csr_read(csr::PGD), Ok(0x10_0000));

    let _ = cpu.csr_write(csr::BADV, 1 << 63).unwrap();
    assert_eq!(cpu.csr_read(csr::PGD), Ok(0x20_0000));
}

#[test]
fn pgd_uses_tlbrbadv_during_refill() {
    let mut cpu = kernel_cpu();
    let _ = cpu.csr_write(csr::PGDL, 0x10_0000).unwrap();
    let _ = cpu.csr_write(csr::PGDH, 0x20_0000).unwrap();
    cpu.csrs.set(csr::TLBRERA, tlbrera::IS_TLBR);
    cpu.csrs.set(csr::TLBRBADV, 1 << 63);
    assert_eq!(cpu.csr_read(csr::PGD), Ok(0x20_0000));
}

#[test]
fn pgd_is_read_only() {
    let mut cpu = kernel_cpu();
    let _ = cpu.csr_write(csr::PGDL, 0x10_0000).unwrap();
    assert_eq!(cpu.csr_write(csr::PGD, 0x5000), Ok(0x10_0000));
    assert_eq!(cpu.csr_read(csr::PGD), Ok(0x10_0000));
}

#[test]
fn snapshot_serialises_the_privileged_state() {
    let mut cpu = kernel_cpu();
    cpu.pc = 0x1c00_0000;
    let snapshot = cpu.csr_snapshot();
    assert_eq!(snapshot.csrs["crmd"], crmd::DA);
    assert_eq!(snapshot.csrs["pgd"], 0);
    assert_eq!(snapshot.plv, PrivilegeLevel::Plv0);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["plv"], "Plv0");
    assert_eq!(json["pc"], 0x1c00_0000);
    assert_eq!(json["tlb"]["fills"], 0);
}
