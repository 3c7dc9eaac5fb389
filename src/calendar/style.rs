use serde::Serialize;

use super::types::{CalendarEvent, LegendEntry};
use crate::models::Location;

/// Used when an event carries no display color.
pub const DEFAULT_EVENT_COLOR: &str = "#3174ad";

pub fn color_for(location: Location) -> &'static str {
    match location {
        Location::Office => "#2563eb",  // blue
        Location::Court => "#dc2626",   // red
        Location::Virtual => "#16a34a", // green
        Location::Other => "#9333ea",   // purple
    }
}

/// Inline style applied to an event block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStyle {
    pub background_color: String,
    pub border_radius: &'static str,
    pub opacity: f32,
    pub color: &'static str,
    pub border: &'static str,
    pub display: &'static str,
}

/// Block style for an event; a missing display color falls back to the default.
pub fn style_for(event: &CalendarEvent) -> EventStyle {
    let background = if event.display_color.is_empty() {
        DEFAULT_EVENT_COLOR
    } else {
        event.display_color.as_str()
    };
    EventStyle {
        background_color: background.to_string(),
        border_radius: "5px",
        opacity: 0.9,
        color: "white",
        border: "0px",
        display: "block",
    }
}

pub fn legend() -> Vec<LegendEntry> {
    Location::ALL
        .iter()
        .map(|loc| LegendEntry {
            location: *loc,
            label: loc.label().to_string(),
            color: color_for(*loc).to_string(),
        })
        .collect()
}
