//! Simulation components.

/// Identifier of a simulation component.
///
/// Identifiers are assigned sequentially starting from zero in the order of component registration.
pub type Id = u32;
