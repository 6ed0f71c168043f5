
/// Seeded victim selection.
pub mod replacement;
