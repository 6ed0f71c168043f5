//! CPU fixtures shared by the unit tests.

use lasim_core::config::Config;
use lasim_core::core::Cpu;
use lasim_core::core::arch::csr::{self, crmd, euen, tlbidx};
use lasim_core::core::arch::mode::PrivilegeLevel;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test writer. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A reset CPU at PLV0 with FP, LSX and LASX enabled in `EUEN`.
pub fn kernel_cpu() -> Cpu {
    init_tracing();
    let mut cpu = Cpu::new(&Config::default());
    let _ = cpu.csr_write(csr::EUEN, euen::FPE | euen::SXE | euen::ASXE).unwrap();
    cpu
}

/// A CPU with paged translation enabled (`CRMD.PG`, `DA` clear) at PLV0.
pub fn paged_cpu() -> Cpu {
    let mut cpu = kernel_cpu();
    cpu.csrs.set(csr::CRMD, crmd::PG);
    cpu
}

/// Drops the CPU to `plv`, keeping the other `CRMD` bits.
pub fn enter_plv(cpu: &mut Cpu, plv: PrivilegeLevel) {
    cpu.csrs.set_bits(csr::CRMD, crmd::PLV_MASK, plv.bits());
}

/// Stages an entry in `TLBEHI`/`TLBELO0`/`TLBELO1`/`TLBIDX` for `tlbfill`/`tlbwr`.
pub fn stage_entry(cpu: &mut Cpu, va: u64, page_shift: u64, lo0: u64, lo1: u64) {
    let _ = cpu.csr_write(csr::TLBEHI, va).unwrap();
    let _ = cpu.csr_write(csr::TLBELO0, lo0).unwrap();
    let _ = cpu.csr_write(csr::TLBELO1, lo1).unwrap();
    let _ = cpu
        .csr_xchg(csr::TLBIDX, page_shift << tlbidx::PS_SHIFT, tlbidx::PS_MASK << tlbidx::PS_SHIFT)
        .unwrap();
}

/// Switches the current ASID.
pub fn set_asid(cpu: &mut Cpu, asid: u16) {
    let _ = cpu.csr_write(csr::ASID, u64::from(asid)).unwrap();
}
