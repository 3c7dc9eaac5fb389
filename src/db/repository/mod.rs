//! Repository layer: entity-scoped database operations.

mod appointment;

pub use appointment::*;
