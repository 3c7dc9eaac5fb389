use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::style::EventStyle;
use super::view::CalendarView;
use crate::models::{Appointment, Location};
use crate::scheduling::EditorState;

/// A renderable time block handed to the presentation surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub display_color: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Month,
    Week,
    Day,
    Agenda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigate {
    Today,
    Previous,
    Next,
}

/// User interaction emitted by the presentation surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum Gesture {
    SelectSlot {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    SelectEvent {
        id: String,
    },
    EventDrop {
        id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    EventResize {
        id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Toast-style message shown after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: Option<String>,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, message: Option<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title, None)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, title, Some(message.into()))
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, title, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The form opened (or re-targeted) for the given editor state.
    FormOpened(EditorState),
    /// A drag-move or resize was committed.
    Rescheduled(Appointment),
    /// The gesture was rejected; nothing changed.
    Failed(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub location: Location,
    pub label: String,
    pub color: String,
}

/// An event paired with the inline style its block is drawn with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledEvent {
    #[serde(flatten)]
    pub event: CalendarEvent,
    pub style: EventStyle,
}

/// Everything the surface needs to draw one frame of the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRender {
    pub view: CalendarView,
    pub step_minutes: u32,
    pub legend: Vec<LegendEntry>,
    pub visible: Vec<StyledEvent>,
    pub events: Vec<CalendarEvent>,
}
