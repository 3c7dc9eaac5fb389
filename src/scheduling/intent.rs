//! Change intents: discrete notifications emitted after every committed
//! repository mutation, so a persistence or backend adapter can follow the
//! collection without touching validation or editor logic.
//!
//! Intents are idempotent by id: replaying `Created`/`Updated` upserts the
//! same record, replaying `Deleted` for an absent id is a no-op.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Appointment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ChangeIntent {
    Created(Appointment),
    Updated(Appointment),
    Deleted { id: String },
}

impl ChangeIntent {
    pub fn id(&self) -> &str {
        match self {
            Self::Created(a) | Self::Updated(a) => &a.id,
            Self::Deleted { id } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted { .. } => "deleted",
        }
    }
}

#[derive(Error, Debug)]
#[error("Intent sink '{sink}' failed on {intent} {id}: {reason}")]
pub struct SinkError {
    pub sink: &'static str,
    pub intent: &'static str,
    pub id: String,
    pub reason: String,
}

/// Receiver of change intents.
pub trait IntentSink {
    fn name(&self) -> &'static str;

    fn apply(&mut self, intent: &ChangeIntent) -> Result<(), SinkError>;
}

/// Logs every intent. Stands in for a backend when none is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl IntentSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn apply(&mut self, intent: &ChangeIntent) -> Result<(), SinkError> {
        match intent {
            ChangeIntent::Created(a) | ChangeIntent::Updated(a) => tracing::info!(
                intent = intent.kind(),
                id = %a.id,
                start = %a.start,
                end = %a.end,
                minutes = a.duration().num_minutes(),
                "Appointment {}",
                intent.kind()
            ),
            ChangeIntent::Deleted { id } => {
                tracing::info!(intent = "deleted", id = %id, "Appointment deleted")
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentKind, Location};
    use chrono::NaiveDate;

    fn appointment() -> Appointment {
        let day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        Appointment {
            id: "apt-7".into(),
            title: "Deposition prep".into(),
            client_id: "c4".into(),
            client_name: "Emily Wilson".into(),
            start: day.and_hms_opt(13, 0, 0).unwrap(),
            end: day.and_hms_opt(14, 0, 0).unwrap(),
            location: Location::Court,
            notes: String::new(),
            kind: AppointmentKind::ClientMeeting,
        }
    }

    #[test]
    fn id_and_kind_cover_every_variant() {
        let apt = appointment();
        assert_eq!(ChangeIntent::Created(apt.clone()).id(), "apt-7");
        assert_eq!(ChangeIntent::Updated(apt).kind(), "updated");
        let deleted = ChangeIntent::Deleted { id: "apt-9".into() };
        assert_eq!(deleted.id(), "apt-9");
        assert_eq!(deleted.kind(), "deleted");
    }

    #[test]
    fn serializes_with_intent_tag() {
        let json = serde_json::to_value(ChangeIntent::Deleted { id: "apt-9".into() }).unwrap();
        assert_eq!(json["intent"], "deleted");
        assert_eq!(json["id"], "apt-9");

        let json = serde_json::to_value(ChangeIntent::Created(appointment())).unwrap();
        assert_eq!(json["intent"], "created");
        assert_eq!(json["clientId"], "c4");
    }

    #[test]
    fn log_sink_accepts_everything() {
        let mut sink = LogSink;
        assert!(sink.apply(&ChangeIntent::Created(appointment())).is_ok());
        assert!(sink.apply(&ChangeIntent::Deleted { id: "x".into() }).is_ok());
    }
}
