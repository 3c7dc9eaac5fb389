use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::{AppointmentKind, Location};

/// A titled, time-ranged scheduling record tied to one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub title: String,
    pub client_id: String,
    /// Snapshot of the client name taken when the client was chosen.
    pub client_name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub notes: String,
    #[serde(default, rename = "type")]
    pub kind: AppointmentKind,
}

/// Every appointment field except the id. Payload of create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFields {
    pub title: String,
    pub client_id: String,
    pub client_name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub notes: String,
    #[serde(default, rename = "type")]
    pub kind: AppointmentKind,
}

impl Appointment {
    pub fn from_fields(id: String, fields: AppointmentFields) -> Self {
        Self {
            id,
            title: fields.title,
            client_id: fields.client_id,
            client_name: fields.client_name,
            start: fields.start,
            end: fields.end,
            location: fields.location,
            notes: fields.notes,
            kind: fields.kind,
        }
    }

    pub fn fields(&self) -> AppointmentFields {
        AppointmentFields {
            title: self.title.clone(),
            client_id: self.client_id.clone(),
            client_name: self.client_name.clone(),
            start: self.start,
            end: self.end,
            location: self.location,
            notes: self.notes.clone(),
            kind: self.kind,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when `[start, end)` intersects `[from, to)`.
    pub fn overlaps(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        self.start < to && self.end > from
    }
}
