


/// Sticky flags, cause, enables and trapping.
pub mod exception_flags;

/// Fused multiply-add in every negation form and rounding mode.
pub mod fma;
