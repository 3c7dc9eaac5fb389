use chrono::{NaiveDate, NaiveDateTime};

use super::style;
use super::types::*;
use super::view::CalendarView;
use crate::config::CalendarSettings;
use crate::directory::{ClientDirectory, InMemoryDirectory};
use crate::models::Appointment;
use crate::scheduling::{
    AppointmentRepository, ConfirmDelete, DeleteOutcome, EditorError, EditorState, FormField,
    IntentSink, RepositoryError, SlotEditor, SlotRange, MSG_END_BEFORE_START, MSG_TITLE_REQUIRED,
};

/// Calendar presentation adapter.
///
/// Owns the repository, the editor and the client directory. Every error
/// raised below this point is recovered here and turned into a `Notice`.
#[derive(Debug)]
pub struct CalendarAdapter<D = InMemoryDirectory> {
    repository: AppointmentRepository,
    editor: SlotEditor,
    directory: D,
    view: CalendarView,
    settings: CalendarSettings,
}

impl<D: ClientDirectory> CalendarAdapter<D> {
    pub fn new(
        repository: AppointmentRepository,
        directory: D,
        settings: CalendarSettings,
        today: NaiveDate,
    ) -> Self {
        Self {
            repository,
            editor: SlotEditor::new(),
            directory,
            view: CalendarView::new(settings.default_view, today),
            settings,
        }
    }

    pub fn repository(&self) -> &AppointmentRepository {
        &self.repository
    }

    pub fn attach_sink(&mut self, sink: Box<dyn IntentSink>) {
        self.repository.attach_sink(sink);
    }

    pub fn editor(&self) -> &SlotEditor {
        &self.editor
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    // ── View state ──────────────────────────────────────────

    pub fn view(&self) -> &CalendarView {
        &self.view
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.view.mode = mode;
    }

    pub fn navigate(&mut self, nav: Navigate, today: NaiveDate) {
        self.view
            .navigate(nav, today, self.settings.agenda_length_days);
    }

    pub fn visible_range(&self) -> (NaiveDateTime, NaiveDateTime) {
        self.view.visible_range(self.settings.agenda_length_days)
    }

    // ── Projection ──────────────────────────────────────────

    /// Every appointment as a render block, in repository order.
    pub fn events(&self) -> Vec<CalendarEvent> {
        self.repository.list().iter().map(to_event).collect()
    }

    /// Blocks intersecting the current grid, sorted by start.
    pub fn visible_events(&self) -> Vec<CalendarEvent> {
        let (from, to) = self.visible_range();
        let mut events: Vec<CalendarEvent> = self
            .repository
            .list()
            .iter()
            .filter(|a| a.overlaps(from, to))
            .map(to_event)
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        style::legend()
    }

    /// One frame for the surface: view, legend, styled visible blocks and
    /// the full event list.
    pub fn render(&self) -> CalendarRender {
        CalendarRender {
            view: self.view,
            step_minutes: self.settings.step_minutes,
            legend: self.legend(),
            visible: self
                .visible_events()
                .into_iter()
                .map(|event| StyledEvent {
                    style: style::style_for(&event),
                    event,
                })
                .collect(),
            events: self.events(),
        }
    }

    // ── Gestures ────────────────────────────────────────────

    pub fn handle(&mut self, gesture: Gesture) -> GestureOutcome {
        tracing::debug!(?gesture, "Gesture received");
        match gesture {
            Gesture::SelectSlot { start, end } => {
                self.editor.select_slot(SlotRange { start, end });
                GestureOutcome::FormOpened(self.editor.state().clone())
            }
            Gesture::SelectEvent { id } => match self.editor.select_event(&self.repository, &id) {
                Ok(()) => GestureOutcome::FormOpened(self.editor.state().clone()),
                Err(e) => GestureOutcome::Failed(notice_for(&e)),
            },
            Gesture::EventDrop { id, start, end } => {
                match SlotEditor::move_event(&mut self.repository, &id, start, end) {
                    Ok(apt) => GestureOutcome::Rescheduled(apt),
                    Err(e) => GestureOutcome::Failed(notice_for(&e)),
                }
            }
            Gesture::EventResize { id, start, end } => {
                match SlotEditor::resize_event(&mut self.repository, &id, start, end) {
                    Ok(apt) => GestureOutcome::Rescheduled(apt),
                    Err(e) => GestureOutcome::Failed(notice_for(&e)),
                }
            }
        }
    }

    /// "+ New Appointment" button.
    pub fn new_appointment(&mut self, now: NaiveDateTime) -> GestureOutcome {
        self.editor.new_appointment(now, self.settings.step_minutes);
        GestureOutcome::FormOpened(self.editor.state().clone())
    }

    // ── Form ────────────────────────────────────────────────

    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), Notice> {
        self.editor
            .set_field(field, value)
            .map_err(|e| notice_for(&e))
    }

    pub fn choose_client(&mut self, client_id: &str) -> Result<(), Notice> {
        self.editor
            .choose_client(&self.directory, client_id)
            .map_err(|e| notice_for(&e))
    }

    /// Commits the form. Field errors stay visible through `editor().errors()`.
    pub fn submit(&mut self) -> Result<(Appointment, Notice), Notice> {
        let creating = matches!(self.editor.state(), EditorState::EditingNew(_));
        let apt = self
            .editor
            .submit(&mut self.repository, &self.directory)
            .map_err(|e| notice_for(&e))?;
        let notice = if creating {
            Notice::success("Appointment created")
        } else {
            Notice::success("Appointment updated")
        };
        Ok((apt, notice))
    }

    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    pub fn delete(
        &mut self,
        confirm: &mut dyn ConfirmDelete,
    ) -> Result<(DeleteOutcome, Notice), Notice> {
        let outcome = self
            .editor
            .delete(&mut self.repository, confirm)
            .map_err(|e| notice_for(&e))?;
        let notice = match outcome {
            DeleteOutcome::Deleted(_) => Notice::success("Appointment deleted"),
            DeleteOutcome::Declined => Notice::info("Delete cancelled"),
        };
        Ok((outcome, notice))
    }
}

fn to_event(apt: &Appointment) -> CalendarEvent {
    CalendarEvent {
        id: apt.id.clone(),
        title: apt.title.clone(),
        start: apt.start,
        end: apt.end,
        display_color: style::color_for(apt.location).to_string(),
    }
}

fn notice_for(err: &EditorError) -> Notice {
    let notice = match err {
        EditorError::Validation(errors) => {
            Notice::error("Please fix the highlighted fields", errors.to_string())
        }
        EditorError::Repository(RepositoryError::NotFound { .. }) => Notice::error(
            "Appointment not found",
            "It may have been removed. Please refresh the calendar.",
        ),
        EditorError::Repository(RepositoryError::InvalidRange { .. }) => {
            Notice::error("Invalid time range", MSG_END_BEFORE_START)
        }
        EditorError::Repository(RepositoryError::MissingTitle) => {
            Notice::error("Invalid appointment", MSG_TITLE_REQUIRED)
        }
        EditorError::NotEditing | EditorError::NotEditingExisting => Notice::info(err.to_string()),
    };
    if notice.kind == NoticeKind::Error {
        tracing::warn!(error = %err, "Calendar operation failed");
    }
    notice
}
