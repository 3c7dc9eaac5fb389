//! Appointment form model and field validation.
//!
//! Every rule runs independently; all violations are reported together,
//! keyed by the field they belong to, so the form can show them inline.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::directory::ClientDirectory;
use crate::models::{Appointment, AppointmentFields, AppointmentKind, Location};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub const MSG_TITLE_REQUIRED: &str = "Title is required";
pub const MSG_CLIENT_REQUIRED: &str = "Please select a client";
pub const MSG_CLIENT_UNKNOWN: &str = "Selected client no longer exists";
pub const MSG_START_DATE_REQUIRED: &str = "Start date is required";
pub const MSG_START_TIME_REQUIRED: &str = "Start time is required";
pub const MSG_END_DATE_REQUIRED: &str = "End date is required";
pub const MSG_END_TIME_REQUIRED: &str = "End time is required";
pub const MSG_END_BEFORE_START: &str = "End time must be after start time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Title,
    ClientId,
    StartDate,
    StartTime,
    EndDate,
    EndTime,
    Location,
    Notes,
}

/// Field-scoped validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(BTreeMap<FormField, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: FormField, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: FormField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Raw form state: dates and times are kept as the text the inputs hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentForm {
    pub title: String,
    pub client_id: String,
    pub client_name: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub location: Location,
    pub notes: String,
}

impl AppointmentForm {
    /// Blank form pre-filled with a selected slot's range.
    pub fn for_slot(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start_date: format_date(start),
            start_time: format_time(start),
            end_date: format_date(end),
            end_time: format_time(end),
            ..Self::default()
        }
    }

    pub fn from_appointment(apt: &Appointment) -> Self {
        Self {
            title: apt.title.clone(),
            client_id: apt.client_id.clone(),
            client_name: apt.client_name.clone(),
            start_date: format_date(apt.start),
            start_time: format_time(apt.start),
            end_date: format_date(apt.end),
            end_time: format_time(apt.end),
            location: apt.location,
            notes: apt.notes.clone(),
        }
    }

    /// Writes one text field. `ClientId` here does not resolve the name;
    /// the editor's `choose_client` does. `Location` must be a known value.
    pub fn set(&mut self, field: FormField, value: &str) -> Result<(), ValidationErrors> {
        match field {
            FormField::Title => self.title = value.to_string(),
            FormField::ClientId => self.client_id = value.to_string(),
            FormField::StartDate => self.start_date = value.to_string(),
            FormField::StartTime => self.start_time = value.to_string(),
            FormField::EndDate => self.end_date = value.to_string(),
            FormField::EndTime => self.end_time = value.to_string(),
            FormField::Notes => self.notes = value.to_string(),
            FormField::Location => {
                self.location = value.parse().map_err(|_| {
                    ValidationErrors::single(
                        FormField::Location,
                        format!("Unknown location: {value}"),
                    )
                })?;
            }
        }
        Ok(())
    }
}

pub fn format_date(at: NaiveDateTime) -> String {
    at.format(DATE_FORMAT).to_string()
}

pub fn format_time(at: NaiveDateTime) -> String {
    at.format(TIME_FORMAT).to_string()
}

/// Parses a date input (`YYYY-MM-DD`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Parses a time input (`HH:MM`, seconds tolerated).
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Validates one date/time pair, recording failures on the given fields.
fn resolve_instant(
    date: &str,
    time: &str,
    (date_field, date_missing, date_bad): (FormField, &str, &str),
    (time_field, time_missing, time_bad): (FormField, &str, &str),
    errors: &mut ValidationErrors,
) -> Option<NaiveDateTime> {
    let day = if date.trim().is_empty() {
        errors.insert(date_field, date_missing);
        None
    } else {
        let parsed = parse_date(date);
        if parsed.is_none() {
            errors.insert(date_field, date_bad);
        }
        parsed
    };

    let clock = if time.trim().is_empty() {
        errors.insert(time_field, time_missing);
        None
    } else {
        let parsed = parse_time(time);
        if parsed.is_none() {
            errors.insert(time_field, time_bad);
        }
        parsed
    };

    Some(day?.and_time(clock?))
}

/// Range rule shared by the form and the drag gestures.
pub fn validate_range(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), ValidationErrors> {
    if end <= start {
        return Err(ValidationErrors::single(FormField::EndTime, MSG_END_BEFORE_START));
    }
    Ok(())
}

/// Runs every form rule and builds the record to commit.
///
/// The client name is re-resolved from the directory, so a stale snapshot in
/// the form cannot be committed. Title and notes are trimmed.
pub fn validate_form(
    form: &AppointmentForm,
    directory: &dyn ClientDirectory,
) -> Result<AppointmentFields, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = form.title.trim();
    if title.is_empty() {
        errors.insert(FormField::Title, MSG_TITLE_REQUIRED);
    }

    let client = if form.client_id.trim().is_empty() {
        errors.insert(FormField::ClientId, MSG_CLIENT_REQUIRED);
        None
    } else {
        let found = directory.find(&form.client_id);
        if found.is_none() {
            errors.insert(FormField::ClientId, MSG_CLIENT_UNKNOWN);
        }
        found
    };

    let start = resolve_instant(
        &form.start_date,
        &form.start_time,
        (FormField::StartDate, MSG_START_DATE_REQUIRED, "Invalid start date"),
        (FormField::StartTime, MSG_START_TIME_REQUIRED, "Invalid start time"),
        &mut errors,
    );
    let end = resolve_instant(
        &form.end_date,
        &form.end_time,
        (FormField::EndDate, MSG_END_DATE_REQUIRED, "Invalid end date"),
        (FormField::EndTime, MSG_END_TIME_REQUIRED, "Invalid end time"),
        &mut errors,
    );

    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            errors.insert(FormField::EndTime, MSG_END_BEFORE_START);
        }
    }

    match (client, start, end) {
        (Some(client), Some(start), Some(end)) if errors.is_empty() => Ok(AppointmentFields {
            title: title.to_string(),
            client_id: client.id,
            client_name: client.name,
            start,
            end,
            location: form.location,
            notes: form.notes.trim().to_string(),
            kind: AppointmentKind::ClientMeeting,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;

    fn filled() -> AppointmentForm {
        AppointmentForm {
            title: "  Intake - Doe  ".into(),
            client_id: "c1".into(),
            client_name: "stale name".into(),
            start_date: "2025-01-10".into(),
            start_time: "09:00".into(),
            end_date: "2025-01-10".into(),
            end_time: "09:30".into(),
            location: Location::Office,
            notes: " bring ID ".into(),
        }
    }

    #[test]
    fn valid_form_builds_trimmed_fields() {
        let fields = validate_form(&filled(), &InMemoryDirectory::demo()).unwrap();
        assert_eq!(fields.title, "Intake - Doe");
        assert_eq!(fields.notes, "bring ID");
        assert_eq!(fields.client_name, "John Smith");
        assert_eq!(fields.start.to_string(), "2025-01-10 09:00:00");
        assert_eq!(fields.end.to_string(), "2025-01-10 09:30:00");
    }

    #[test]
    fn blank_form_reports_every_required_field() {
        let errors = validate_form(&AppointmentForm::default(), &InMemoryDirectory::demo())
            .unwrap_err();
        assert_eq!(errors.get(FormField::Title), Some(MSG_TITLE_REQUIRED));
        assert_eq!(errors.get(FormField::ClientId), Some(MSG_CLIENT_REQUIRED));
        assert_eq!(errors.get(FormField::StartDate), Some(MSG_START_DATE_REQUIRED));
        assert_eq!(errors.get(FormField::StartTime), Some(MSG_START_TIME_REQUIRED));
        assert_eq!(errors.get(FormField::EndDate), Some(MSG_END_DATE_REQUIRED));
        assert_eq!(errors.get(FormField::EndTime), Some(MSG_END_TIME_REQUIRED));
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn whitespace_title_is_missing() {
        let mut form = filled();
        form.title = "   ".into();
        let errors = validate_form(&form, &InMemoryDirectory::demo()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(FormField::Title));
    }

    #[test]
    fn unknown_client_is_rejected() {
        let mut form = filled();
        form.client_id = "c42".into();
        let errors = validate_form(&form, &InMemoryDirectory::demo()).unwrap_err();
        assert_eq!(errors.get(FormField::ClientId), Some(MSG_CLIENT_UNKNOWN));
    }

    #[test]
    fn end_before_start_reports_on_end_time() {
        let mut form = filled();
        form.start_time = "10:00".into();
        form.end_time = "09:00".into();
        let errors = validate_form(&form, &InMemoryDirectory::demo()).unwrap_err();
        assert_eq!(errors.get(FormField::EndTime), Some(MSG_END_BEFORE_START));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn equal_start_and_end_is_rejected() {
        let mut form = filled();
        form.end_time = "09:00".into();
        let errors = validate_form(&form, &InMemoryDirectory::demo()).unwrap_err();
        assert!(errors.contains(FormField::EndTime));
    }

    #[test]
    fn end_on_later_day_may_have_earlier_clock_time() {
        let mut form = filled();
        form.start_time = "17:00".into();
        form.end_date = "2025-01-11".into();
        form.end_time = "08:00".into();
        assert!(validate_form(&form, &InMemoryDirectory::demo()).is_ok());
    }

    #[test]
    fn unparseable_time_is_reported_and_range_skipped() {
        let mut form = filled();
        form.start_time = "9 o'clock".into();
        let errors = validate_form(&form, &InMemoryDirectory::demo()).unwrap_err();
        assert_eq!(errors.get(FormField::StartTime), Some("Invalid start time"));
        assert!(!errors.contains(FormField::EndTime));
    }

    #[test]
    fn errors_are_not_short_circuited() {
        let mut form = filled();
        form.title.clear();
        form.client_id.clear();
        form.start_time = "10:00".into();
        form.end_time = "09:00".into();
        let errors = validate_form(&form, &InMemoryDirectory::demo()).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn parse_time_accepts_seconds() {
        assert_eq!(parse_time("09:30:00"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert!(parse_time("25:00").is_none());
    }

    #[test]
    fn for_slot_prefills_range_only() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let form = AppointmentForm::for_slot(start, start + chrono::Duration::minutes(30));
        assert_eq!(form.start_date, "2025-03-04");
        assert_eq!(form.start_time, "14:30");
        assert_eq!(form.end_time, "15:00");
        assert!(form.title.is_empty());
        assert_eq!(form.location, Location::Office);
    }

    #[test]
    fn set_location_rejects_unknown_value() {
        let mut form = filled();
        assert!(form.set(FormField::Location, "court").is_ok());
        assert_eq!(form.location, Location::Court);
        let errors = form.set(FormField::Location, "moon").unwrap_err();
        assert!(errors.contains(FormField::Location));
        assert_eq!(form.location, Location::Court);
    }

    #[test]
    fn validate_range_matches_form_rule() {
        let t = NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let errors = validate_range(t, t).unwrap_err();
        assert_eq!(errors.get(FormField::EndTime), Some(MSG_END_BEFORE_START));
        assert!(validate_range(t, t + chrono::Duration::minutes(1)).is_ok());
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.insert(FormField::Title, MSG_TITLE_REQUIRED);
        errors.insert(FormField::EndTime, MSG_END_BEFORE_START);
        assert_eq!(
            errors.to_string(),
            "Title is required; End time must be after start time"
        );
    }
}
