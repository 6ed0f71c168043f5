//! CPU State Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, the container for the architectural
//! state a block of translated code operates on. It coordinates the following:
//! 1. **State Management:** General registers, the vector/FP register file, `fcsr0`, the
//!    CSR file, the program counter and the stable counter.
//! 2. **Register-File Forms:** Running FP and vector operations on register indices with
//!    the unit-enable checks applied.
//! 3. **Privileged Operations:** CSR access, TLB maintenance and exception delivery,
//!    implemented in the submodules.
//! 4. **Time:** Deterministic advance of the stable counter and the timer.

/// CSR access and register side effects.
pub mod csr;

/// TLB maintenance instructions and address translation.
pub mod tlb;

/// Exception raising, delivery and return.
pub mod trap;

use std::fmt::Write;

use crate::common::Exception;
use crate::common::constants::{CPUCFG_WORDS, VREG_COUNT};
use crate::config::Config;
use crate::core::arch::csr::{self as csrs, Csrs, asid, crmd, ecfg, estat, euen, tcfg};
use crate::core::arch::fpr::VRegFile;
use crate::core::arch::gpr::Gpr;
use crate::core::arch::mode::PrivilegeLevel;
use crate::core::arch::trap::ecode;
use crate::core::units::fpu::Fpu;
use crate::core::units::mmu::Tlb;
use crate::core::units::simd::{VReg, VecBinaryOp, VecImmOp, VecWidth};

/// Architectural state of one LoongArch64 CPU.
///
/// A `Cpu` is owned by the thread running its translated code; it holds no shared state.
#[derive(Debug)]
pub struct Cpu {
    /// General-purpose registers.
    pub gpr: Gpr,
    /// Vector registers; `f<n>` aliases the low 64 bits of `xr<n>`.
    pub vregs: VRegFile,
    /// Floating-point control/status and condition flags.
    pub fpu: Fpu,
    /// Privileged CSRs.
    pub csrs: Csrs,
    /// Program counter.
    pub pc: u64,
    /// Translation lookaside buffer.
    pub tlb: Tlb,
    /// Stable counter.
    pub counter: u64,
    /// Set by `idle`, cleared when an enabled interrupt becomes pending or on delivery.
    pub idle: bool,
    cpucfg: [u32; CPUCFG_WORDS],
    lsx: bool,
    lasx: bool,
    timer_armed: bool,
}

impl Cpu {
    /// Creates a CPU in its reset state (PLV0, direct address translation).
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_id(config, 0)
    }

    /// Creates a CPU whose `CPUID` CSR reads `cpu_id`.
    pub fn with_id(config: &Config, cpu_id: u64) -> Self {
        tracing::debug!(
            cpu_id,
            tlb_entries = config.tlb.entries,
            lsx = config.vector.lsx,
            lasx = config.vector.lasx,
            "cpu reset"
        );
        Self {
            gpr: Gpr::new(),
            vregs: VRegFile::new(),
            fpu: Fpu::new(),
            csrs: Csrs::new(config.tlb.entries, cpu_id),
            pc: 0,
            tlb: Tlb::new(config.tlb.entries, config.tlb.seed),
            counter: config.timer.initial_counter,
            idle: false,
            cpucfg: config.cpucfg_words(),
            lsx: config.vector.lsx,
            lasx: config.vector.lasx,
            timer_armed: false,
        }
    }

    /// Current privilege level (`CRMD.PLV`).
    pub fn plv(&self) -> PrivilegeLevel {
        PrivilegeLevel::from_bits(self.csrs.get(csrs::CRMD) & crmd::PLV_MASK)
    }

    /// Current address space identifier (`ASID.ASID`).
    pub fn asid(&self) -> u16 {
        (self.csrs.get(csrs::ASID) & asid::ASID_MASK) as u16
    }

    /// Fails with `InstructionPrivilege` unless running at PLV0.
    pub(crate) fn require_kernel(&self) -> Result<(), Exception> {
        if self.plv().is_kernel() {
            Ok(())
        } else {
            Err(Exception::InstructionPrivilege)
        }
    }

    /// Reads CPUCFG word `index`; words beyond the table read as zero.
    pub fn cpucfg(&self, index: u64) -> u64 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.cpucfg.get(i))
            .map_or(0, |&w| u64::from(w))
    }

    /// Reads the stable counter (`rdtime.d`).
    pub const fn rdtime_d(&self) -> u64 {
        self.counter
    }

    /// Advances the stable counter and the timer by `ticks`.
    ///
    /// The timer counts `TVAL` down while armed. Reaching zero sets `ESTAT.TI`; a periodic
    /// timer reloads from `TCFG.InitVal`, a one-shot timer stops at zero. An idle CPU wakes
    /// when an interrupt enabled in `ECFG.LIE` is pending.
    pub fn advance(&mut self, ticks: u64) {
        self.counter = self.counter.wrapping_add(ticks);

        if self.timer_armed {
            let remaining = self.csrs.get(csrs::TVAL);
            if ticks < remaining {
                self.csrs.set(csrs::TVAL, remaining - ticks);
            } else {
                let cfg = self.csrs.get(csrs::TCFG);
                let init = cfg & tcfg::INITVAL_MASK;
                let next = if cfg & tcfg::PERIODIC != 0 && init != 0 {
                    let rem = (ticks - remaining) % init;
                    if rem == 0 { init } else { init - rem }
                } else {
                    self.timer_armed = false;
                    0
                };
                self.csrs.set(csrs::TVAL, next);
                self.csrs.set_bits(csrs::ESTAT, estat::TI, estat::TI);
                tracing::debug!(counter = self.counter, next, "timer interrupt");
            }
        }

        if self.idle && self.interrupt_pending() {
            self.idle = false;
            tracing::debug!("idle wake");
        }
    }

    /// True when an interrupt line is both pending (`ESTAT.IS`) and enabled (`ECFG.LIE`).
    pub fn interrupt_pending(&self) -> bool {
        let pending = self.csrs.get(csrs::ESTAT) & 0x1fff;
        let enabled = self.csrs.get(csrs::ECFG) & 0x1fff;
        pending & enabled != 0
    }

    /// Checks that `EUEN` and the configuration allow an operation of `width`.
    fn require_vector(&self, width: VecWidth) -> Result<(), Exception> {
        let euen_bits = self.csrs.get(csrs::EUEN);
        match width {
            VecWidth::Lsx if !self.lsx => Err(Exception::InstructionNotExist(0)),
            VecWidth::Lasx if !self.lasx => Err(Exception::InstructionNotExist(0)),
            VecWidth::Lsx if euen_bits & euen::SXE == 0 => {
                Err(Exception::Raised { ecode: ecode::SXD, value: 0 })
            }
            VecWidth::Lasx if euen_bits & euen::ASXE == 0 => {
                Err(Exception::Raised { ecode: ecode::ASXD, value: 0 })
            }
            _ => Ok(()),
        }
    }

    /// Runs a three-register vector operation on the register file.
    ///
    /// Sources are copied before the destination is written, so `vd` may equal `vj` or `vk`.
    ///
    /// # Errors
    ///
    /// Returns `InstructionNotExist` when the width is not configured, or the SXD/ASXD
    /// exception when `EUEN` disables it.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasim_core::config::Config;
    /// use lasim_core::core::Cpu;
    /// use lasim_core::core::units::simd::{VReg, VecWidth, widen};
    ///
    /// let mut cpu = Cpu::new(&Config::default());
    /// let _ = cpu.csr_write(0x2, 0x7).unwrap();
    /// cpu.vregs.set_vreg(1, VReg::from_lanes::<i8>(&[3, -5, 10, 2]));
    /// cpu.vop(widen::vhaddw_h_b, 1, 1, 1, VecWidth::Lsx).unwrap();
    /// assert_eq!(cpu.vregs.vreg(1).lane::<i16>(0), -2);
    /// ```
    pub fn vop(
        &mut self,
        op: VecBinaryOp,
        vd: usize,
        vj: usize,
        vk: usize,
        width: VecWidth,
    ) -> Result<(), Exception> {
        self.require_vector(width)?;
        let (j, k): (VReg, VReg) = (*self.vregs.vreg(vj), *self.vregs.vreg(vk));
        op(self.vregs.vreg_mut(vd), &j, &k, width);
        Ok(())
    }

    /// Runs a register-immediate vector operation on the register file.
    ///
    /// # Errors
    ///
    /// As [`Cpu::vop`], plus the operation's own immediate check.
    pub fn vop_imm(
        &mut self,
        op: VecImmOp,
        vd: usize,
        vj: usize,
        imm: i64,
        width: VecWidth,
    ) -> Result<(), Exception> {
        self.require_vector(width)?;
        let j = *self.vregs.vreg(vj);
        let mut d = *self.vregs.vreg(vd);
        op(&mut d, &j, imm, width)?;
        self.vregs.set_vreg(vd, d);
        Ok(())
    }

    /// Runs a two-operand scalar FP operation on `f<fj>`, `f<fk>` into `f<fd>`.
    ///
    /// The destination is left unchanged when the operation traps.
    ///
    /// # Errors
    ///
    /// Returns `FpDisabled` when `EUEN.FPE` is clear, or the operation's exception.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasim_core::config::Config;
    /// use lasim_core::core::Cpu;
    /// use lasim_core::core::units::fpu::Fpu;
    ///
    /// let mut cpu = Cpu::new(&Config::default());
    /// let _ = cpu.csr_write(0x2, 0x1).unwrap();
    /// cpu.vregs.set_fpr(1, 1.5f64.to_bits());
    /// cpu.vregs.set_fpr(2, 2.25f64.to_bits());
    /// cpu.fop2(Fpu::fadd_d, 3, 1, 2).unwrap();
    /// assert_eq!(f64::from_bits(cpu.vregs.fpr(3)), 3.75);
    /// ```
    pub fn fop2(
        &mut self,
        op: fn(&mut Fpu, u64, u64) -> Result<u64, Exception>,
        fd: usize,
        fj: usize,
        fk: usize,
    ) -> Result<(), Exception> {
        self.require_fpu()?;
        let result = op(&mut self.fpu, self.vregs.fpr(fj), self.vregs.fpr(fk))?;
        self.vregs.set_fpr(fd, result);
        Ok(())
    }

    /// Runs a three-operand fused FP operation (`fmadd` family) into `f<fd>`.
    ///
    /// # Errors
    ///
    /// Returns `FpDisabled` when `EUEN.FPE` is clear, or the operation's exception.
    pub fn fop3(
        &mut self,
        op: fn(&mut Fpu, u64, u64, u64, u32) -> Result<u64, Exception>,
        fd: usize,
        (fj, fk, fa): (usize, usize, usize),
        flags: u32,
    ) -> Result<(), Exception> {
        self.require_fpu()?;
        let (j, k, a) = (self.vregs.fpr(fj), self.vregs.fpr(fk), self.vregs.fpr(fa));
        let result = op(&mut self.fpu, j, k, a, flags)?;
        self.vregs.set_fpr(fd, result);
        Ok(())
    }

    fn require_fpu(&self) -> Result<(), Exception> {
        if self.csrs.get(csrs::EUEN) & euen::FPE == 0 {
            return Err(Exception::FpDisabled);
        }
        Ok(())
    }

    /// Renders the register state for diagnostics.
    pub fn dump_state(&self) -> String {
        let mut out = format!(
            "pc = {:#018x} plv = {} asid = {} fcsr0 = {:#010x}\n",
            self.pc,
            self.plv(),
            self.asid(),
            self.fpu.fcsr()
        );
        out.push_str(&self.gpr.dump());
        for i in 0..VREG_COUNT {
            let _ = writeln!(out, "f{i:<2} = {:#018x}", self.vregs.fpr(i));
        }
        out
    }

    /// `ECFG.VS`.
    fn vector_spacing(&self) -> u32 {
        ((self.csrs.get(csrs::ECFG) >> ecfg::VS_SHIFT) & ecfg::VS_MASK) as u32
    }
}
