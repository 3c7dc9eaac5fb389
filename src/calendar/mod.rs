//! Calendar presentation adapter: projects the appointment repository into
//! colored time blocks on a month/week/day/agenda grid and routes the four
//! gesture types (select slot, select event, drag-move, drag-resize) back to
//! the slot/event editor.

mod adapter;
mod style;
mod types;
mod view;

pub use adapter::*;
pub use style::*;
pub use types::*;
pub use view::*;

// ── Tests ──────────────────────────────────────────────────────────────────
