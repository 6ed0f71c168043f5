//! # Unit Components
//!
//! Tests organised the way the library is: shared types, configuration, and the core
//! (architecture definitions, CPU state machine, execution units).

/// Address types and the exception channel.
pub mod common;
