//! Slot/event editor: the modal appointment form's state machine.
//!
//! ```text
//! Idle ──select_slot──▶ EditingNew(range)
//! Idle ──select_event─▶ EditingExisting(id)
//! Editing* ──cancel | submit ok | delete ok──▶ Idle
//! ```
//!
//! Drag-move and drag-resize bypass the form entirely and go straight to
//! `AppointmentRepository::reschedule`.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::repository::{AppointmentRepository, RepositoryError};
use super::validation::{self, AppointmentForm, FormField, ValidationErrors};
use crate::directory::ClientDirectory;
use crate::models::Appointment;

/// An empty time range picked on the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "target", rename_all = "snake_case")]
pub enum EditorState {
    Idle,
    EditingNew(SlotRange),
    EditingExisting(String),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("No appointment is being edited")]
    NotEditing,

    #[error("Only an existing appointment can be deleted")]
    NotEditingExisting,
}

/// Destructive-action confirmation, asked before a delete.
pub trait ConfirmDelete {
    fn confirm(&mut self, appointment: &Appointment) -> bool;
}

impl<F> ConfirmDelete for F
where
    F: FnMut(&Appointment) -> bool,
{
    fn confirm(&mut self, appointment: &Appointment) -> bool {
        self(appointment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Appointment),
    /// User declined the confirmation; nothing changed.
    Declined,
}

/// The grid cell of `step_minutes` that contains `at`.
pub fn step_slot(at: NaiveDateTime, step_minutes: u32) -> SlotRange {
    let step = i64::from(step_minutes.max(1));
    let minute_of_day = i64::from(at.hour() * 60 + at.minute());
    let start =
        at.date().and_time(NaiveTime::MIN) + Duration::minutes(minute_of_day - minute_of_day % step);
    SlotRange {
        start,
        end: start + Duration::minutes(step),
    }
}

#[derive(Debug, Clone)]
pub struct SlotEditor {
    state: EditorState,
    form: AppointmentForm,
    errors: ValidationErrors,
}

impl Default for SlotEditor {
    fn default() -> Self {
        Self {
            state: EditorState::Idle,
            form: AppointmentForm::default(),
            errors: ValidationErrors::new(),
        }
    }
}

impl SlotEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != EditorState::Idle
    }

    pub fn form(&self) -> &AppointmentForm {
        &self.form
    }

    /// Pending inline errors from the last failed submit or field write.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn select_slot(&mut self, range: SlotRange) {
        tracing::debug!(start = %range.start, end = %range.end, "Slot selected");
        self.form = AppointmentForm::for_slot(range.start, range.end);
        self.errors.clear();
        self.state = EditorState::EditingNew(range);
    }

    /// Opens the form on a stored appointment. Unknown ids leave the editor as is.
    pub fn select_event(
        &mut self,
        repository: &AppointmentRepository,
        id: &str,
    ) -> Result<(), EditorError> {
        let apt = repository
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })?;
        tracing::debug!(id, "Event selected");
        self.form = AppointmentForm::from_appointment(apt);
        self.errors.clear();
        self.state = EditorState::EditingExisting(apt.id.clone());
        Ok(())
    }

    /// "+ New Appointment": one grid step, starting at `now` snapped down
    /// to the step boundary.
    pub fn new_appointment(&mut self, now: NaiveDateTime, step_minutes: u32) {
        self.select_slot(step_slot(now, step_minutes));
    }

    /// Writes one form field and clears that field's pending error.
    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), EditorError> {
        if !self.is_open() {
            return Err(EditorError::NotEditing);
        }
        self.errors.remove(field);
        if let Err(e) = self.form.set(field, value) {
            for (f, msg) in e.iter() {
                self.errors.insert(f, msg);
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Picks a client and snapshots its name (empty when unknown).
    pub fn choose_client(
        &mut self,
        directory: &dyn ClientDirectory,
        client_id: &str,
    ) -> Result<(), EditorError> {
        if !self.is_open() {
            return Err(EditorError::NotEditing);
        }
        self.form.client_id = client_id.to_string();
        self.form.client_name = directory.name_of(client_id).unwrap_or_default();
        self.errors.remove(FormField::ClientId);
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    /// Validates the form and creates or updates the appointment.
    ///
    /// On validation failure the editor stays open with `errors()` set. A
    /// `NotFound` from the repository means the edited record vanished; the
    /// editor closes since its target is stale.
    pub fn submit(
        &mut self,
        repository: &mut AppointmentRepository,
        directory: &dyn ClientDirectory,
    ) -> Result<Appointment, EditorError> {
        let fields = match validation::validate_form(&self.form, directory) {
            Ok(fields) => fields,
            Err(errors) => {
                tracing::debug!(count = errors.len(), "Form rejected");
                self.errors = errors.clone();
                return Err(errors.into());
            }
        };

        let result = match &self.state {
            EditorState::Idle => return Err(EditorError::NotEditing),
            EditorState::EditingNew(_) => repository.create(fields),
            EditorState::EditingExisting(id) => repository.update(id, fields),
        };

        match result {
            Ok(apt) => {
                self.close();
                Ok(apt)
            }
            Err(e @ RepositoryError::NotFound { .. }) => {
                tracing::warn!(error = %e, "Edited appointment disappeared");
                self.close();
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the appointment being edited after confirmation.
    pub fn delete(
        &mut self,
        repository: &mut AppointmentRepository,
        confirm: &mut dyn ConfirmDelete,
    ) -> Result<DeleteOutcome, EditorError> {
        let id = match &self.state {
            EditorState::EditingExisting(id) => id.clone(),
            EditorState::EditingNew(_) => return Err(EditorError::NotEditingExisting),
            EditorState::Idle => return Err(EditorError::NotEditing),
        };

        let Some(apt) = repository.get(&id) else {
            self.close();
            return Err(RepositoryError::NotFound { id }.into());
        };
        if !confirm.confirm(apt) {
            tracing::debug!(id = %id, "Delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let removed = repository.delete(&id)?;
        self.close();
        Ok(DeleteOutcome::Deleted(removed))
    }

    /// Drag-to-reschedule: new range, every other field unchanged.
    pub fn move_event(
        repository: &mut AppointmentRepository,
        id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Appointment, EditorError> {
        validation::validate_range(start, end)?;
        Ok(repository.reschedule(id, start, end)?)
    }

    /// Drag-resize. The drag library reports the full resulting range, so
    /// the untouched endpoint arrives unchanged.
    pub fn resize_event(
        repository: &mut AppointmentRepository,
        id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Appointment, EditorError> {
        Self::move_event(repository, id, start, end)
    }

    fn close(&mut self) {
        self.state = EditorState::Idle;
        self.form = AppointmentForm::default();
        self.errors.clear();
    }
}
