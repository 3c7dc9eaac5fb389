//! Appointment scheduling store.
//!
//! - `repository`: owns the appointment collection (create/update/delete/list)
//! - `validation`: form model and independent field rules
//! - `editor`: gesture → repository mapping, the form's state machine
//! - `intent`: change notifications for persistence/backend adapters

pub mod editor;
pub mod intent;
pub mod repository;
pub mod validation;

pub use editor::*;
pub use intent::*;
pub use repository::*;
pub use validation::*;
