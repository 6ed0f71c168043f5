//! Register-file operation tests.
//!
//! Verifies that the FP and vector forms honour the unit enables in `EUEN`, the vector
//! configuration, and leave the destination untouched when they fail.

use lasim_core::common::Exception;
use lasim_core::config::{Config, VectorConfig};
use lasim_core::core::Cpu;
use lasim_core::core::arch::csr::{self, euen};
use lasim_core::core::arch::trap::ecode;
use lasim_core::core::units::fpu::Fpu;
use lasim_core::core::units::fpu::exception_flags::FpFlags;
use lasim_core::core::units::simd::{VReg, VecWidth, arith, widen};

use crate::common::harness::kernel_cpu;

#[test]
fn fp_ops_need_euen_fpe() {
    let mut cpu = Cpu::new(&Config::default());
    assert_eq!(cpu.fop2(Fpu::fadd_d, 0, 1, 2), Err(Exception::FpDisabled));
}

#[test]
fn vector_ops_need_their_euen_bit() {
    let mut cpu = Cpu::new(&Config::default());
    let _ = cpu.csr_write(csr::EUEN, euen::FPE).unwrap();
    assert_eq!(
        cpu.vop(arith::vavg_b, 0, 1, 2, VecWidth::Lsx),
        Err(Exception::Raised { ecode: ecode::SXD, value: 0 })
    );

    let _ = cpu.csr_write(csr::EUEN, euen::FPE | euen::SXE).unwrap();
    assert!(cpu.vop(arith::vavg_b, 0, 1, 2, VecWidth::Lsx).is_ok());
    assert_eq!(
        cpu.vop(arith::vavg_b, 0, 1, 2, VecWidth::Lasx),
        Err(Exception::Raised { ecode: ecode::ASXD, value: 0 })
    );
}

#[test]
fn unconfigured_vector_width_does_not_exist() {
    let config = Config {
        vector: VectorConfig { lsx: true, lasx: false },
        ..Config::default()
    };
    let mut cpu = Cpu::new(&config);
    let _ = cpu.csr_write(csr::EUEN, euen::SXE | euen::ASXE).unwrap();
    assert!(cpu.vop(arith::vmax_w, 0, 1, 2, VecWidth::Lsx).is_ok());
    assert_eq!(
        cpu.vop(arith::vmax_w, 0, 1, 2, VecWidth::Lasx),
        Err(Exception::InstructionNotExist(0))
    );
}

#[test]
fn lsx_ops_keep_the_upper_half() {
    let mut cpu = kernel_cpu();
    cpu.vregs.set_vreg(2, VReg::from_lanes::<u64>(&[0, 0, 7, 8]));
    cpu.vregs.set_vreg(3, VReg::from_lanes::<i8>(&[10; 32]));
    cpu.vregs.set_vreg(4, VReg::from_lanes::<i8>(&[20; 32]));
    cpu.vop(arith::vavg_b, 2, 3, 4, VecWidth::Lsx).unwrap();
    let reg = cpu.vregs.vreg(2);
    assert_eq!(reg.lanes::<i8>(VecWidth::Lsx), vec![15; 16]);
    assert_eq!(reg.lane::<u64>(2), 7);
    assert_eq!(reg.lane::<u64>(3), 8);
}

#[test]
fn destination_may_alias_a_source() {
    let mut cpu = kernel_cpu();
    cpu.vregs.set_vreg(1, VReg::from_lanes::<i8>(&[3, -5, 10, 2]));
    cpu.vop(widen::vhaddw_h_b, 1, 1, 1, VecWidth::Lsx).unwrap();
    assert_eq!(cpu.vregs.vreg(1).lane::<i16>(0), -2);
    assert_eq!(cpu.vregs.vreg(1).lane::<i16>(1), 12);
}

#[test]
fn bad_immediate_leaves_the_destination_alone() {
    let mut cpu = kernel_cpu();
    let before = VReg::from_lanes::<u8>(&[0xaa; 32]);
    cpu.vregs.set_vreg(5, before);
    assert_eq!(
        cpu.vop_imm(arith::vmaxi_b, 5, 6, 16, VecWidth::Lsx),
        Err(Exception::IllegalImmediate { field: "vmaxi_b", value: 16 })
    );
    assert_eq!(*cpu.vregs.vreg(5), before);

    cpu.vop_imm(arith::vmaxi_b, 5, 6, -3, VecWidth::Lsx).unwrap();
    assert_eq!(cpu.vregs.vreg(5).lanes::<i8>(VecWidth::Lsx), vec![0; 16]);
}

#[test]
fn fp_trap_keeps_the_destination() {
    let mut cpu = kernel_cpu();
    cpu.fpu.set_enables(FpFlags::NV);
    cpu.vregs.set_fpr(1, 0f64.to_bits());
    cpu.vregs.set_fpr(2, 0f64.to_bits());
    cpu.vregs.set_fpr(3, 42f64.to_bits());
    assert_eq!(
        cpu.fop2(Fpu::fdiv_d, 3, 1, 2),
        Err(Exception::FloatingPoint { cause: FpFlags::NV })
    );
    assert_eq!(f64::from_bits(cpu.vregs.fpr(3)), 42.0);
    assert_eq!(cpu.fpu.cause(), FpFlags::NV);
    assert!(cpu.fpu.flags().is_empty());
}

#[test]
fn fused_multiply_add_through_the_register_file() {
    let mut cpu = kernel_cpu();
    cpu.vregs.set_fpr(1, 2f64.to_bits());
    cpu.vregs.set_fpr(2, 3f64.to_bits());
    cpu.vregs.set_fpr(3, 1f64.to_bits());
    cpu.fop3(Fpu::fmuladd_d, 4, (1, 2, 3), 0).unwrap();
    assert_eq!(f64::from_bits(cpu.vregs.fpr(4)), 7.0);
}

#[test]
fn single_precision_results_are_nan_boxed() {
    let mut cpu = kernel_cpu();
    cpu.vregs.set_fpr(1, u64::from(1.5f32.to_bits()));
    cpu.vregs.set_fpr(2, u64::from(2.0f32.to_bits()));
    cpu.fop2(Fpu::fmul_s, 3, 1, 2).unwrap();
    assert_eq!(cpu.vregs.fpr(3), 0xffff_ffff_0000_0000 | u64::from(3.0f32.to_bits()));
}

#[test]
fn cpucfg_words() {
    let cpu = kernel_cpu();
    assert_eq!(cpu.cpucfg(4), 100_000_000);
    assert_ne!(cpu.cpucfg(2) & (1 << 6), 0);
    assert_eq!(cpu.cpucfg(21), 0);
    assert_eq!(cpu.cpucfg(u64::MAX), 0);
}

#[test]
fn dump_state_lists_every_register() {
    let mut cpu = kernel_cpu();
    cpu.pc = 0x1c00_0000;
    let dump = cpu.dump_state();
    assert!(dump.starts_with("pc = 0x000000001c000000"));
    assert!(dump.contains("plv = PLV0"));
    assert!(dump.contains("r31="));
    assert!(dump.contains("f31"));
}
