//! Appointment repository: owns the in-memory collection.
//!
//! Ordering is insertion order. Ids are UUID v4 strings and are never
//! reissued within a session, even after the record is deleted. Every
//! successful mutation is forwarded to the attached intent sinks.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use uuid::Uuid;

use super::intent::{ChangeIntent, IntentSink};
use crate::models::{Appointment, AppointmentFields, AppointmentKind, Location};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Appointment not found: {id}")]
    NotFound { id: String },

    #[error("Title is required")]
    MissingTitle,

    #[error("End time must be after start time (start {start}, end {end})")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

#[derive(Default)]
pub struct AppointmentRepository {
    appointments: Vec<Appointment>,
    /// Every id ever handed out or seeded; guards against reuse.
    issued: HashSet<String>,
    sinks: Vec<Box<dyn IntentSink>>,
}

impl std::fmt::Debug for AppointmentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppointmentRepository")
            .field("appointments", &self.appointments)
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl AppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from previously stored records.
    ///
    /// Records with an inverted range or a duplicate id are skipped with a
    /// warning rather than breaking the `end > start` and uniqueness invariants.
    pub fn with_appointments(seed: Vec<Appointment>) -> Self {
        let mut repo = Self::new();
        for apt in seed {
            if apt.end <= apt.start {
                tracing::warn!(id = %apt.id, "Skipping stored appointment with inverted range");
                continue;
            }
            if !repo.issued.insert(apt.id.clone()) {
                tracing::warn!(id = %apt.id, "Skipping duplicate stored appointment id");
                continue;
            }
            repo.appointments.push(apt);
        }
        repo
    }

    /// Attach a sink that receives every subsequent change intent.
    pub fn attach_sink(&mut self, sink: Box<dyn IntentSink>) {
        tracing::debug!(sink = sink.name(), "Intent sink attached");
        self.sinks.push(sink);
    }

    pub fn list(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn create(&mut self, fields: AppointmentFields) -> Result<Appointment, RepositoryError> {
        check_fields(&fields)?;

        let id = self.fresh_id();
        let appointment = Appointment::from_fields(id, fields);
        self.appointments.push(appointment.clone());

        self.emit(ChangeIntent::Created(appointment.clone()));
        Ok(appointment)
    }

    pub fn update(
        &mut self,
        id: &str,
        fields: AppointmentFields,
    ) -> Result<Appointment, RepositoryError> {
        check_fields(&fields)?;

        let slot = self.position(id)?;
        let updated = Appointment::from_fields(id.to_string(), fields);
        self.appointments[slot] = updated.clone();

        self.emit(ChangeIntent::Updated(updated.clone()));
        Ok(updated)
    }

    /// Replaces only the time range, keeping every other field.
    pub fn reschedule(
        &mut self,
        id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Appointment, RepositoryError> {
        check_range(start, end)?;

        let slot = self.position(id)?;
        let apt = &mut self.appointments[slot];
        apt.start = start;
        apt.end = end;
        let updated = apt.clone();

        self.emit(ChangeIntent::Updated(updated.clone()));
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<Appointment, RepositoryError> {
        let slot = self.position(id)?;
        let removed = self.appointments.remove(slot);

        self.emit(ChangeIntent::Deleted {
            id: removed.id.clone(),
        });
        Ok(removed)
    }

    fn position(&self, id: &str) -> Result<usize, RepositoryError> {
        self.appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    fn emit(&mut self, intent: ChangeIntent) {
        tracing::debug!(intent = intent.kind(), id = intent.id(), "Repository mutation");
        for sink in &mut self.sinks {
            if let Err(e) = sink.apply(&intent) {
                tracing::warn!(sink = sink.name(), error = %e, "Intent sink failed");
            }
        }
    }
}

fn check_fields(fields: &AppointmentFields) -> Result<(), RepositoryError> {
    if fields.title.trim().is_empty() {
        return Err(RepositoryError::MissingTitle);
    }
    check_range(fields.start, fields.end)
}

fn check_range(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), RepositoryError> {
    if end <= start {
        return Err(RepositoryError::InvalidRange { start, end });
    }
    Ok(())
}

/// The three appointments the calendar opens with on a fresh install.
pub fn demo_appointments() -> Vec<Appointment> {
    let at = |d: u32, h: u32, m: u32| {
        NaiveDate::from_ymd_opt(2024, 12, d)
            .and_then(|day| day.and_hms_opt(h, m, 0))
            .unwrap_or_default()
    };
    vec![
        Appointment {
            id: "1".into(),
            title: "Initial Consultation - Smith Case".into(),
            client_id: "c1".into(),
            client_name: "John Smith".into(),
            start: at(15, 10, 0),
            end: at(15, 11, 0),
            location: Location::Office,
            notes: "Discuss contract dispute details".into(),
            kind: AppointmentKind::ClientMeeting,
        },
        Appointment {
            id: "2".into(),
            title: "Court Hearing - Johnson v. ABC Corp".into(),
            client_id: "c2".into(),
            client_name: "Sarah Johnson".into(),
            start: at(18, 14, 0),
            end: at(18, 16, 0),
            location: Location::Court,
            notes: "Preliminary hearing at District Court".into(),
            kind: AppointmentKind::ClientMeeting,
        },
        Appointment {
            id: "3".into(),
            title: "Virtual Meeting - Estate Planning".into(),
            client_id: "c3".into(),
            client_name: "Robert Davis".into(),
            start: at(20, 9, 0),
            end: at(20, 10, 30),
            location: Location::Virtual,
            notes: "Review will and trust documents".into(),
            kind: AppointmentKind::ClientMeeting,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::intent::SinkError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn fields(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> AppointmentFields {
        AppointmentFields {
            title: title.into(),
            client_id: "c1".into(),
            client_name: "John Smith".into(),
            start,
            end,
            location: Location::Office,
            notes: String::new(),
            kind: AppointmentKind::ClientMeeting,
        }
    }

    /// Records every intent it sees.
    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<ChangeIntent>>>);

    impl IntentSink for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn apply(&mut self, intent: &ChangeIntent) -> Result<(), SinkError> {
            self.0.borrow_mut().push(intent.clone());
            Ok(())
        }
    }

    struct Failing;

    impl IntentSink for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&mut self, intent: &ChangeIntent) -> Result<(), SinkError> {
            Err(SinkError {
                sink: "failing",
                intent: intent.kind(),
                id: intent.id().to_string(),
                reason: "offline".into(),
            })
        }
    }

    // ───────────────────────────────────────
    // create
    // ───────────────────────────────────────

    #[test]
    fn create_assigns_id_and_stores_fields_verbatim() {
        let mut repo = AppointmentRepository::new();
        let input = fields("Intake - Doe", at(10, 9, 0), at(10, 9, 30));
        let apt = repo.create(input.clone()).unwrap();

        assert!(!apt.id.is_empty());
        assert_eq!(apt.fields(), input);
        assert_eq!(repo.list(), &[apt]);
    }

    #[test]
    fn create_ids_are_unique() {
        let mut repo = AppointmentRepository::new();
        let a = repo.create(fields("A", at(10, 9, 0), at(10, 10, 0))).unwrap();
        let b = repo.create(fields("B", at(10, 9, 0), at(10, 10, 0))).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn create_rejects_inverted_range() {
        let mut repo = AppointmentRepository::new();
        let err = repo
            .create(fields("Bad", at(10, 10, 0), at(10, 9, 0)))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRange { .. }));
        assert!(repo.is_empty());
    }

    #[test]
    fn create_rejects_zero_length_range() {
        let mut repo = AppointmentRepository::new();
        assert!(repo.create(fields("Zero", at(10, 9, 0), at(10, 9, 0))).is_err());
        assert!(repo.is_empty());
    }

    #[test]
    fn create_rejects_blank_title() {
        let recorder = Recorder::default();
        let mut repo = AppointmentRepository::new();
        repo.attach_sink(Box::new(recorder.clone()));

        let err = repo.create(fields("   ", at(10, 9, 0), at(10, 10, 0))).unwrap_err();
        assert_eq!(err, RepositoryError::MissingTitle);
        assert!(repo.is_empty());
        assert!(recorder.0.borrow().is_empty());
    }

    #[test]
    fn update_rejects_blank_title() {
        let mut repo = AppointmentRepository::new();
        let apt = repo.create(fields("Keep", at(10, 9, 0), at(10, 10, 0))).unwrap();
        let err = repo
            .update(&apt.id, fields("", at(10, 9, 0), at(10, 10, 0)))
            .unwrap_err();
        assert_eq!(err, RepositoryError::MissingTitle);
        assert_eq!(repo.list(), &[apt]);
    }

    #[test]
    fn list_keeps_insertion_order() {
        let mut repo = AppointmentRepository::new();
        repo.create(fields("Late", at(12, 9, 0), at(12, 10, 0))).unwrap();
        repo.create(fields("Early", at(10, 9, 0), at(10, 10, 0))).unwrap();
        let titles: Vec<_> = repo.list().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["Late", "Early"]);
    }

    // ───────────────────────────────────────
    // update / reschedule
    // ───────────────────────────────────────

    #[test]
    fn update_preserves_id() {
        let mut repo = AppointmentRepository::new();
        let apt = repo.create(fields("Old", at(10, 9, 0), at(10, 10, 0))).unwrap();
        let updated = repo
            .update(&apt.id, fields("New", at(11, 9, 0), at(11, 10, 0)))
            .unwrap();

        assert_eq!(updated.id, apt.id);
        assert_eq!(repo.get(&apt.id).unwrap().title, "New");
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn update_unknown_id_is_not_found_and_unchanged() {
        let mut repo = AppointmentRepository::new();
        let apt = repo.create(fields("Keep", at(10, 9, 0), at(10, 10, 0))).unwrap();
        let err = repo
            .update("missing", fields("X", at(10, 9, 0), at(10, 10, 0)))
            .unwrap_err();

        assert_eq!(err, RepositoryError::NotFound { id: "missing".into() });
        assert_eq!(repo.list(), &[apt]);
    }

    #[test]
    fn update_with_inverted_range_leaves_record() {
        let mut repo = AppointmentRepository::new();
        let apt = repo.create(fields("Keep", at(10, 9, 0), at(10, 10, 0))).unwrap();
        assert!(repo
            .update(&apt.id, fields("Keep", at(10, 11, 0), at(10, 10, 0)))
            .is_err());
        assert_eq!(repo.get(&apt.id), Some(&apt));
    }

    #[test]
    fn reschedule_only_touches_range() {
        let mut repo = AppointmentRepository::new();
        let apt = repo.create(fields("Hearing", at(10, 9, 0), at(10, 10, 0))).unwrap();
        let moved = repo.reschedule(&apt.id, at(11, 14, 0), at(11, 15, 0)).unwrap();

        assert_eq!(moved.id, apt.id);
        assert_eq!(moved.title, apt.title);
        assert_eq!(moved.client_id, apt.client_id);
        assert_eq!((moved.start, moved.end), (at(11, 14, 0), at(11, 15, 0)));
    }

    #[test]
    fn reschedule_rejects_inverted_range() {
        let mut repo = AppointmentRepository::new();
        let apt = repo.create(fields("Hearing", at(10, 9, 0), at(10, 10, 0))).unwrap();
        assert!(matches!(
            repo.reschedule(&apt.id, at(10, 12, 0), at(10, 11, 0)),
            Err(RepositoryError::InvalidRange { .. })
        ));
        assert_eq!(repo.get(&apt.id), Some(&apt));
    }

    // ───────────────────────────────────────
    // delete
    // ───────────────────────────────────────

    #[test]
    fn delete_removes_exactly_one() {
        let mut repo = AppointmentRepository::new();
        let first = repo.create(fields("First", at(10, 9, 0), at(10, 10, 0))).unwrap();
        let second = repo.create(fields("Second", at(10, 11, 0), at(10, 12, 0))).unwrap();
        let third = repo.create(fields("Third", at(10, 13, 0), at(10, 14, 0))).unwrap();

        repo.delete(&second.id).unwrap();
        assert_eq!(repo.list(), &[first, third]);
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let mut repo = AppointmentRepository::new();
        repo.create(fields("Keep", at(10, 9, 0), at(10, 10, 0))).unwrap();
        assert!(matches!(
            repo.delete("nope"),
            Err(RepositoryError::NotFound { .. })
        ));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn deleted_ids_are_not_reissued() {
        let mut repo = AppointmentRepository::new();
        let apt = repo.create(fields("Gone", at(10, 9, 0), at(10, 10, 0))).unwrap();
        repo.delete(&apt.id).unwrap();
        assert!(repo.issued.contains(&apt.id));
        let next = repo.create(fields("Next", at(10, 9, 0), at(10, 10, 0))).unwrap();
        assert_ne!(next.id, apt.id);
    }

    // ───────────────────────────────────────
    // seeding
    // ───────────────────────────────────────

    #[test]
    fn with_appointments_skips_invalid_records() {
        let mut seed = demo_appointments();
        let mut inverted = seed[0].clone();
        inverted.id = "bad".into();
        std::mem::swap(&mut inverted.start, &mut inverted.end);
        seed.push(inverted);
        seed.push(seed[1].clone());

        let repo = AppointmentRepository::with_appointments(seed);
        assert_eq!(repo.len(), 3);
        assert!(repo.get("bad").is_none());
    }

    #[test]
    fn demo_appointments_are_valid() {
        let demo = demo_appointments();
        assert_eq!(demo.len(), 3);
        assert!(demo.iter().all(|a| a.end > a.start));
        assert_eq!(demo[1].location, Location::Court);
    }

    // ───────────────────────────────────────
    // intents
    // ───────────────────────────────────────

    #[test]
    fn every_mutation_emits_one_intent() {
        let recorder = Recorder::default();
        let mut repo = AppointmentRepository::new();
        repo.attach_sink(Box::new(recorder.clone()));

        let apt = repo.create(fields("A", at(10, 9, 0), at(10, 10, 0))).unwrap();
        repo.reschedule(&apt.id, at(10, 11, 0), at(10, 12, 0)).unwrap();
        repo.delete(&apt.id).unwrap();

        let kinds: Vec<_> = recorder.0.borrow().iter().map(|i| i.kind()).collect();
        assert_eq!(kinds, ["created", "updated", "deleted"]);
    }

    #[test]
    fn failed_mutations_emit_nothing() {
        let recorder = Recorder::default();
        let mut repo = AppointmentRepository::new();
        repo.attach_sink(Box::new(recorder.clone()));

        let _ = repo.create(fields("Bad", at(10, 10, 0), at(10, 9, 0)));
        let _ = repo.delete("missing");
        assert!(recorder.0.borrow().is_empty());
    }

    #[test]
    fn sink_failure_does_not_undo_mutation() {
        let mut repo = AppointmentRepository::new();
        repo.attach_sink(Box::new(Failing));
        let apt = repo.create(fields("A", at(10, 9, 0), at(10, 10, 0))).unwrap();
        assert_eq!(repo.get(&apt.id), Some(&apt));
    }
}
