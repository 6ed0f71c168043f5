//! LoongArch64 instruction-semantics core.
//!
//! This crate implements the helper layer a dynamic binary translator calls into when a
//! guest instruction is too involved to expand inline. It provides the following:
//! 1. **Numeric:** Width-generic saturating, averaging and multiply-high lane primitives.
//! 2. **Floating Point:** A bit-exact IEEE 754 engine with `fcsr0` rounding and flag state.
//! 3. **Vector:** LSX (128-bit) and LASX (256-bit) lane-wise and widening arithmetic.
//! 4. **MMU:** A software-managed TLB with LoongArch invalidation and permission semantics.
//! 5. **Privileged State:** CSRs, exception delivery, the timer and TLB maintenance.
//!
//! Every fallible operation returns `Result<_, Exception>`; the caller pairs the exception
//! with the guest PC and hands it to [`Cpu::deliver`].

/// Common types and constants (addresses, access types, exceptions).
pub mod common;
/// Configuration (defaults, sections, validation).
pub mod config;
/// CPU state, architecture definitions and execution units.
pub mod core;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Architectural state of one CPU.
pub use crate::core::Cpu;
/// Exception channel types.
pub use crate::common::{Exception, Fault};
