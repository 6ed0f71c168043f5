//! TLB maintenance instruction tests.

use lasim_core::common::Exception;
use lasim_core::core::Cpu;
use lasim_core::core::arch::csr::{self, tlbehi, tlbidx, tlbrera};
use lasim_core::core::arch::mode::PrivilegeLevel;
use lasim_core::core::units::mmu::tlb::tlbelo;
use rstest::rstest;

use crate::common::harness::{enter_plv, kernel_cpu, set_asid, stage_entry};

const LO0: u64 = (0x1234 << tlbelo::PPN_SHIFT) | tlbelo::V | tlbelo::D;
const LO1: u64 = (0x1235 << tlbelo::PPN_SHIFT) | tlbelo::V | tlbelo::D;

fn fill(cpu: &mut Cpu, va: u64, lo0: u64, lo1: u64) {
    stage_entry(cpu, va, 12, lo0, lo1);
    cpu.tlbfill().unwrap();
}

fn select_index(cpu: &mut Cpu, index: u64) {
    let _ = cpu.csr_xchg(csr::TLBIDX, index, tlbidx::INDEX_MASK | tlbidx::NE).unwrap();
}

#[test]
fn search_finds_a_filled_entry() {
    let mut cpu = kernel_cpu();
    fill(&mut cpu, 0x4000_0000, LO0, LO1);

    let _ = cpu.csr_write(csr::TLBEHI, 0x4000_1000).unwrap();
    cpu.tlbsrch().unwrap();
    let idx = cpu.csrs.get(csr::TLBIDX);
    assert_eq!(idx & tlbidx::NE, 0);
    assert_eq!(idx & tlbidx::INDEX_MASK, 0);
}

#[test]
fn search_miss_sets_ne() {
    let mut cpu = kernel_cpu();
    fill(&mut cpu, 0x4000_0000, LO0, LO1);
    let _ = cpu.csr_write(csr::TLBEHI, 0x8000_0000).unwrap();
    cpu.tlbsrch().unwrap();
    assert_ne!(cpu.csrs.get(csr::TLBIDX) & tlbidx::NE, 0);
}

#[test]
fn search_respects_the_asid() {
    let mut cpu = kernel_cpu();
    set_asid(&mut cpu, 1);
    fill(&mut cpu, 0x4000_0000, LO0, LO1);
    set_asid(&mut cpu, 2);
    cpu.tlbsrch().unwrap();
    assert_ne!(cpu.csrs.get(csr::TLBIDX) & tlbidx::NE, 0);
}

#[test]
fn read_back_a_filled_entry() {
    let mut cpu = kernel_cpu();
    set_asid(&mut cpu, 7);
    fill(&mut cpu, 0x4000_0000, LO0, LO1);

    stage_entry(&mut cpu, 0, 0, 0, 0);
    set_asid(&mut cpu, 0);
    select_index(&mut cpu, 0);
    cpu.tlbrd().unwrap();

    assert_eq!(cpu.csrs.get(csr::TLBEHI), 0x4000_0000);
    assert_eq!(cpu.csrs.get(csr::TLBELO0), LO0);
    assert_eq!(cpu.csrs.get(csr::TLBELO1), LO1);
    let idx = cpu.csrs.get(csr::TLBIDX);
    assert_eq!(idx & tlbidx::NE, 0);
    assert_eq!((idx >> tlbidx::PS_SHIFT) & tlbidx::PS_MASK, 12);
    assert_eq!(cpu.asid(), 7);
}

#[test]
fn reading_an_empty_slot_sets_ne_and_clears_staging() {
    let mut cpu = kernel_cpu();
    stage_entry(&mut cpu, 0x4000_0000, 12, LO0, LO1);
    set_asid(&mut cpu, 3);
    select_index(&mut cpu, 5);
    cpu.tlbrd().unwrap();

    assert_ne!(cpu.csrs.get(csr::TLBIDX) & tlbidx::NE, 0);
    assert_eq!(cpu.csrs.get(csr::TLBEHI), 0);
    assert_eq!(cpu.csrs.get(csr::TLBELO0), 0);
    assert_eq!(cpu.csrs.get(csr::TLBELO1), 0);
    assert_eq!(cpu.asid(), 0);
}

#[test]
fn indexed_write_and_erase() {
    let mut cpu = kernel_cpu();
    stage_entry(&mut cpu, 0x8000_0000, 14, LO0, LO1);
    select_index(&mut cpu, 3);
    cpu.tlbwr().unwrap();

    let entry = cpu.tlb.entry(3).copied().unwrap();
    assert_eq!(entry.page_shift, 14);
    assert_eq!(entry.start(), 0x8000_0000);
    assert_eq!(cpu.tlb.len(), 1);

    let _ = cpu.csr_xchg(csr::TLBIDX, tlbidx::NE, tlbidx::NE).unwrap();
    cpu.tlbwr().unwrap();
    assert!(cpu.tlb.entry(3).is_none());
    assert!(cpu.tlb.is_empty());
}

#[test]
fn indexed_write_replaces_an_overlapping_fill() {
    let mut cpu = kernel_cpu();
    let old = (1 << tlbelo::PPN_SHIFT) | tlbelo::V | tlbelo::D;
    fill(&mut cpu, 0x4000_0000, old, old);
    assert!(cpu.tlb.entry(0).is_some());

    let new = (9 << tlbelo::PPN_SHIFT) | tlbelo::V | tlbelo::D;
    stage_entry(&mut cpu, 0x4000_0000, 12, new, new);
    select_index(&mut cpu, 5);
    cpu.tlbwr().unwrap();

    let matching: Vec<_> = cpu
        .tlb
        .entries()
        .filter(|(_, e)| e.matches(0, 0x4000_0000))
        .map(|(i, e)| (i, e.pages[0].ppn))
        .collect();
    assert_eq!(matching, vec![(5, 9)]);
    assert_eq!(cpu.tlb.lookup(0, 0x4000_0000).unwrap().half.ppn, 9);
    assert_eq!(cpu.tlb.stats().evictions, 1);
}

#[test]
fn unsupported_page_size_is_ignored() {
    let mut cpu = kernel_cpu();
    stage_entry(&mut cpu, 0x4000_0000, 5, LO0, LO1);
    cpu.tlbfill().unwrap();
    select_index(&mut cpu, 0);
    cpu.tlbwr().unwrap();
    assert!(cpu.tlb.is_empty());
}

#[test]
fn global_needs_g_in_both_halves() {
    let mut cpu = kernel_cpu();
    fill(&mut cpu, 0x4000_0000, LO0 | tlbelo::G, LO1);
    assert!(!cpu.tlb.entry(0).unwrap().global);

    fill(&mut cpu, 0x4000_0000, LO0 | tlbelo::G, LO1 | tlbelo::G);
    assert_eq!(cpu.tlb.len(), 1);
    let (_, entry) = cpu.tlb.entries().next().unwrap();
    assert!(entry.global);
}

#[test]
fn refill_overlapping_entry_replaces_it() {
    let mut cpu = kernel_cpu();
    fill(&mut cpu, 0x4000_0000, LO0, LO1);
    fill(&mut cpu, 0x4000_1000, LO1, LO0);
    assert_eq!(cpu.tlb.len(), 1);
    assert_eq!(cpu.tlb.stats().evictions, 1);
}

/// One global entry at 0x10000, ASID 1 at 0x20000 and ASID 2 at 0x30000.
fn three_entries() -> Cpu {
    let mut cpu = kernel_cpu();
    fill(&mut cpu, 0x1_0000, LO0 | tlbelo::G, LO1 | tlbelo::G);
    set_asid(&mut cpu, 1);
    fill(&mut cpu, 0x2_0000, LO0, LO1);
    set_asid(&mut cpu, 2);
    fill(&mut cpu, 0x3_0000, LO0, LO1);
    cpu
}

#[test]
fn tlbclr_removes_the_current_asid_only() {
    let mut cpu = three_entries();
    cpu.tlbclr().unwrap();
    assert_eq!(cpu.tlb.len(), 2);
    assert!(cpu.tlb.probe(2, 0x3_0000).is_none());
    assert!(cpu.tlb.probe(1, 0x2_0000).is_some());
    assert!(cpu.tlb.probe(2, 0x1_0000).is_some());
}

#[test]
fn tlbflush_removes_everything() {
    let mut cpu = three_entries();
    cpu.tlbflush().unwrap();
    assert!(cpu.tlb.is_empty());
}

#[rstest]
#[case(0, 0)]
#[case(1, 0)]
#[case(2, 2)]
#[case(3, 1)]
#[case(4, 2)]
#[case(5, 2)]
#[case(6, 2)]
fn invtlb_ops(#[case] op: u32, #[case] remaining: usize) {
    let mut cpu = three_entries();
    cpu.invtlb(op, 1, 0x2_0000).unwrap();
    assert_eq!(cpu.tlb.len(), remaining);
}

#[test]
fn invtlb_page_or_global_removes_a_global_page() {
    let mut cpu = three_entries();
    cpu.invtlb(6, 5, 0x1_0000).unwrap();
    assert_eq!(cpu.tlb.len(), 2);
    assert!(cpu.tlb.probe(0, 0x1_0000).is_none());
}

#[test]
fn invtlb_rejects_unknown_ops() {
    let mut cpu = three_entries();
    assert_eq!(
        cpu.invtlb(7, 0, 0),
        Err(Exception::IllegalImmediate { field: "invtlb op", value: 7 })
    );
    assert_eq!(cpu.tlb.len(), 3);
}

#[test]
fn maintenance_is_privileged() {
    let mut cpu = kernel_cpu();
    enter_plv(&mut cpu, PrivilegeLevel::Plv3);
    assert_eq!(cpu.tlbsrch(), Err(Exception::InstructionPrivilege));
    assert_eq!(cpu.tlbrd(), Err(Exception::InstructionPrivilege));
    assert_eq!(cpu.tlbwr(), Err(Exception::InstructionPrivilege));
    assert_eq!(cpu.tlbfill(), Err(Exception::InstructionPrivilege));
    assert_eq!(cpu.tlbclr(), Err(Exception::InstructionPrivilege));
    assert_eq!(cpu.tlbflush(), Err(Exception::InstructionPrivilege));
    assert_eq!(cpu.invtlb(0, 0, 0), Err(Exception::InstructionPrivilege));
}

#[test]
fn refill_handler_stages_through_the_tlbr_registers() {
    let mut cpu = kernel_cpu();
    // ordinary staging registers hold a different, unusable entry
    stage_entry(&mut cpu, 0x8000_0000, 5, 0, 0);

    cpu.csrs.set(csr::TLBRERA, tlbrera::IS_TLBR);
    let _ = cpu.csr_write(csr::TLBREHI, 0x5000_0000 | 12).unwrap();
    let _ = cpu.csr_write(csr::TLBRELO0, LO0).unwrap();
    let _ = cpu.csr_write(csr::TLBRELO1, LO1).unwrap();
    cpu.tlbfill().unwrap();

    assert!(cpu.tlb.probe(cpu.asid(), 0x5000_1000).is_some());
    assert_eq!(cpu.tlb.entry(0).unwrap().page_shift, 12);

    cpu.tlbsrch().unwrap();
    assert_eq!(cpu.csrs.get(csr::TLBIDX) & tlbidx::NE, 0);
    assert_eq!(cpu.csrs.get(csr::TLBREHI) & tlbehi::PS_MASK, 12);
}
