use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::Appointment;
use crate::scheduling::{ChangeIntent, IntentSink, SinkError};

/// Sub-second digits are written only when present, in 3, 6 or 9 digit
/// groups, so text order matches time order and the `end_at > start_at`
/// CHECK agrees with the in-memory range check.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Inserts or replaces an appointment by id. New rows go to the end of the
/// stored order; existing rows keep their position.
pub fn upsert_appointment(conn: &Connection, apt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, title, client_id, client_name, start_at, end_at,
         location, notes, kind, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9,
                 (SELECT COALESCE(MAX(position), 0) + 1 FROM appointments))
         ON CONFLICT(id) DO UPDATE SET
             title = excluded.title,
             client_id = excluded.client_id,
             client_name = excluded.client_name,
             start_at = excluded.start_at,
             end_at = excluded.end_at,
             location = excluded.location,
             notes = excluded.notes,
             kind = excluded.kind",
        params![
            apt.id,
            apt.title,
            apt.client_id,
            apt.client_name,
            apt.start.format(TIMESTAMP_FORMAT).to_string(),
            apt.end.format(TIMESTAMP_FORMAT).to_string(),
            apt.location.as_str(),
            apt.notes,
            apt.kind.as_str(),
        ],
    )?;
    Ok(())
}

/// Removes an appointment. Returns whether a row existed.
pub fn delete_appointment(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let deleted = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn get_appointment(conn: &Connection, id: &str) -> Result<Appointment, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, client_id, client_name, start_at, end_at, location, notes, kind
         FROM appointments WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], appointment_row_from_rusqlite)?;
    let first = rows.next();
    match first {
        Some(row) => appointment_from_row(row?),
        None => Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.into(),
        }),
    }
}

/// All stored appointments in insertion order.
pub fn load_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, client_id, client_name, start_at, end_at, location, notes, kind
         FROM appointments ORDER BY position",
    )?;
    let rows = stmt.query_map([], appointment_row_from_rusqlite)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}

struct AppointmentRow {
    id: String,
    title: String,
    client_id: String,
    client_name: String,
    start_at: String,
    end_at: String,
    location: String,
    notes: String,
    kind: String,
}

fn appointment_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        title: row.get(1)?,
        client_id: row.get(2)?,
        client_name: row.get(3)?,
        start_at: row.get(4)?,
        end_at: row.get(5)?,
        location: row.get(6)?,
        notes: row.get(7)?,
        kind: row.get(8)?,
    })
}

fn parse_timestamp(column: &str, value: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        DatabaseError::InvalidTimestamp {
            column: column.into(),
            value: value.into(),
        }
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        start: parse_timestamp("start_at", &row.start_at)?,
        end: parse_timestamp("end_at", &row.end_at)?,
        location: Location::from_str(&row.location)?,
        kind: AppointmentKind::from_str(&row.kind)?,
        id: row.id,
        title: row.title,
        client_id: row.client_id,
        client_name: row.client_name,
        notes: row.notes,
    })
}

/// Persistence adapter: follows the repository through its change intents.
///
/// Replays are safe: created/updated upsert by id, deleting an absent id
/// is a no-op.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn write(&self, intent: &ChangeIntent) -> Result<(), DatabaseError> {
        match intent {
            ChangeIntent::Created(apt) | ChangeIntent::Updated(apt) => {
                upsert_appointment(&self.conn, apt)
            }
            ChangeIntent::Deleted { id } => {
                if !delete_appointment(&self.conn, id)? {
                    tracing::debug!(id = %id, "Delete intent for absent row");
                }
                Ok(())
            }
        }
    }
}

impl IntentSink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn apply(&mut self, intent: &ChangeIntent) -> Result<(), SinkError> {
        self.write(intent).map_err(|e| SinkError {
            sink: "sqlite",
            intent: intent.kind(),
            id: intent.id().to_string(),
            reason: e.to_string(),
        })
    }
}
