//! Conversion between nested mappings and flat dot-separated keys

pub mod flatten;
pub mod nest;

pub use flatten::flatten;
pub use nest::nest;

/// Joins nested key names in a flat key path.
pub const KEY_SEPARATOR: char = '.';
