pub mod appointment;
pub mod client;
pub mod enums;

pub use appointment::*;
pub use client::*;
pub use enums::*;
