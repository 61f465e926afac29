use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::{
    calendar::{CalendarEvent, EventKind},
    core::db::{Appointment, AppointmentRepository, AppointmentUpdate, NewAppointment, StoreResult},
};

#[derive(Debug, Clone, PartialEq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub kind: EventKind,
    pub date: Date,
    pub time: Time,
    pub client_id: Option<i64>,
}

impl EventForm {
    fn blank(day: Date, default_time: Time, client_id: Option<i64>) -> Self {
        EventForm {
            title: String::new(),
            description: String::new(),
            kind: EventKind::Appointment,
            date: day,
            time: default_time,
            client_id,
        }
    }

    fn from_event(event: &CalendarEvent, default_time: Time) -> Self {
        EventForm {
            title: event.title.clone(),
            description: event.description.clone(),
            kind: event.kind(),
            date: event.date,
            time: event.time.unwrap_or(default_time),
            client_id: event.client_id,
        }
    }

    /// The form's date and time as a UTC timestamp.
    pub fn timestamp(&self) -> OffsetDateTime {
        PrimitiveDateTime::new(self.date, self.time).assume_utc()
    }

    pub fn is_valid(&self) -> bool {
        !self.title.is_empty()
    }

    fn to_new_appointment(&self) -> NewAppointment {
        NewAppointment {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.timestamp(),
            client_id: self.client_id,
            time: self.time,
        }
    }

    fn to_update(&self) -> AppointmentUpdate {
        AppointmentUpdate {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            date: Some(self.timestamp()),
            client_id: Some(self.client_id),
            time: Some(self.time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    Creating {
        form: EventForm,
    },
    Editing {
        event: CalendarEvent,
        form: EventForm,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Closed,
    EmptyTitle,
    /// An entry still being created has nothing stored to delete.
    Unsaved,
    /// Milestones are derived from projects and cannot be written here.
    Milestone,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Created(Appointment),
    Updated(Appointment),
    Skipped(SkipReason),
}

impl SaveOutcome {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SaveOutcome::Created(_) => Some("Appointment created successfully"),
            SaveOutcome::Updated(_) => Some("Appointment updated successfully"),
            SaveOutcome::Skipped(_) => None,
        }
    }

    /// Whether the calendar has to be reloaded after this outcome.
    pub fn needs_refresh(&self) -> bool {
        !matches!(
            self,
            SaveOutcome::Skipped(SkipReason::Closed | SkipReason::EmptyTitle)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Appointment),
    Skipped(SkipReason),
}

impl DeleteOutcome {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            DeleteOutcome::Deleted(_) => Some("Appointment deleted successfully"),
            DeleteOutcome::Skipped(_) => None,
        }
    }

    /// Whether the calendar has to be reloaded after this outcome.
    pub fn needs_refresh(&self) -> bool {
        matches!(
            self,
            DeleteOutcome::Deleted(_) | DeleteOutcome::Skipped(SkipReason::Milestone)
        )
    }
}

/// Create/edit form for one calendar entry.
///
/// Only appointments are ever written. Store failures leave the editor open
/// with its form intact so the user can retry.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEditor {
    state: EditorState,
    default_time: Time,
}

impl EventEditor {
    pub fn new(default_time: Time) -> Self {
        Self {
            state: EditorState::Closed,
            default_time,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, EditorState::Closed)
    }

    pub fn form(&self) -> Option<&EventForm> {
        match &self.state {
            EditorState::Closed => None,
            EditorState::Creating { form } | EditorState::Editing { form, .. } => Some(form),
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut EventForm> {
        match &mut self.state {
            EditorState::Closed => None,
            EditorState::Creating { form } | EditorState::Editing { form, .. } => Some(form),
        }
    }

    pub fn selected(&self) -> Option<&CalendarEvent> {
        match &self.state {
            EditorState::Editing { event, .. } => Some(event),
            _ => None,
        }
    }

    pub fn open_day(&mut self, day: Date, client_id: Option<i64>) {
        self.state = EditorState::Creating {
            form: EventForm::blank(day, self.default_time, client_id),
        };
    }

    /// Starts a new entry on `today`, as the "New Event" action does.
    pub fn open_new_today(&mut self, today: Date, client_id: Option<i64>) {
        self.open_day(today, client_id);
    }

    pub fn open_event(&mut self, event: &CalendarEvent) {
        self.state = EditorState::Editing {
            form: EventForm::from_event(event, self.default_time),
            event: event.clone(),
        };
    }

    pub fn cancel(&mut self) {
        self.state = EditorState::Closed;
    }

    /// Type changes are locked while a milestone is selected.
    pub fn set_kind(&mut self, kind: EventKind) {
        let locked = self
            .selected()
            .is_some_and(|event| event.kind() == EventKind::Milestone);
        if let (false, Some(form)) = (locked, self.form_mut()) {
            form.kind = kind;
        }
    }

    pub fn can_save(&self) -> bool {
        self.form().is_some_and(EventForm::is_valid)
    }

    pub fn can_delete(&self) -> bool {
        self.selected()
            .is_some_and(|event| event.kind() == EventKind::Appointment)
    }

    pub async fn save<S: AppointmentRepository>(&mut self, store: &S) -> StoreResult<SaveOutcome> {
        let outcome = match &self.state {
            EditorState::Closed => return Ok(SaveOutcome::Skipped(SkipReason::Closed)),
            EditorState::Creating { form } | EditorState::Editing { form, .. } if !form.is_valid() => {
                return Ok(SaveOutcome::Skipped(SkipReason::EmptyTitle));
            }
            EditorState::Editing { event, form } => match event.id.appointment_id() {
                Some(id) => SaveOutcome::Updated(store.update_appointment(id, &form.to_update()).await?),
                None => SaveOutcome::Skipped(SkipReason::Milestone),
            },
            EditorState::Creating { form } => match form.kind {
                EventKind::Appointment => {
                    SaveOutcome::Created(store.add_appointment(&form.to_new_appointment()).await?)
                }
                EventKind::Milestone => SaveOutcome::Skipped(SkipReason::Milestone),
            },
        };
        self.state = EditorState::Closed;
        Ok(outcome)
    }

    /// Deletes the selected appointment. A selected milestone is left alone
    /// but the editor still closes.
    pub async fn delete<S: AppointmentRepository>(&mut self, store: &S) -> StoreResult<DeleteOutcome> {
        let id = match &self.state {
            EditorState::Closed => return Ok(DeleteOutcome::Skipped(SkipReason::Closed)),
            EditorState::Creating { .. } => return Ok(DeleteOutcome::Skipped(SkipReason::Unsaved)),
            EditorState::Editing { event, .. } => event.id.appointment_id(),
        };
        let outcome = match id {
            Some(id) => DeleteOutcome::Deleted(store.delete_appointment(id).await?),
            None => DeleteOutcome::Skipped(SkipReason::Milestone),
        };
        self.state = EditorState::Closed;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::EventId;
    use crate::core::db::ColorTag;
    use time::macros::{date, datetime, time};

    fn milestone() -> CalendarEvent {
        CalendarEvent {
            id: EventId::Milestone { project_id: 4 },
            title: "Loft - Target Date".to_string(),
            description: String::new(),
            date: date!(2024 - 06 - 01),
            time: None,
            client_id: Some(2),
            color: ColorTag::Orange,
        }
    }

    #[test]
    fn open_day_seeds_blank_form() {
        let mut editor = EventEditor::new(time!(9:00));
        assert!(!editor.is_open());
        editor.open_day(date!(2024 - 05 - 10), Some(3));
        let form = editor.form().unwrap();
        assert_eq!(form.date, date!(2024 - 05 - 10));
        assert_eq!(form.time, time!(9:00));
        assert_eq!(form.kind, EventKind::Appointment);
        assert_eq!(form.client_id, Some(3));
        assert!(!editor.can_save());
        assert!(!editor.can_delete());
    }

    #[test]
    fn timestamp_is_utc_composition() {
        let mut editor = EventEditor::new(time!(9:00));
        editor.open_day(date!(2024 - 05 - 10), None);
        assert_eq!(editor.form().unwrap().timestamp(), datetime!(2024-05-10 9:00 UTC));
    }

    #[test]
    fn milestone_kind_is_locked() {
        let mut editor = EventEditor::new(time!(9:00));
        editor.open_event(&milestone());
        editor.set_kind(EventKind::Appointment);
        assert_eq!(editor.form().unwrap().kind, EventKind::Milestone);
        assert_eq!(editor.form().unwrap().time, time!(9:00));
        assert!(editor.can_save());
        assert!(!editor.can_delete());

        editor.cancel();
        assert_eq!(editor.state(), &EditorState::Closed);
        assert!(editor.form().is_none());
    }

    #[test]
    fn refresh_rules() {
        assert!(SaveOutcome::Skipped(SkipReason::Milestone).needs_refresh());
        assert!(!SaveOutcome::Skipped(SkipReason::EmptyTitle).needs_refresh());
        assert_eq!(DeleteOutcome::Skipped(SkipReason::Milestone).notice(), None);
        assert!(DeleteOutcome::Skipped(SkipReason::Milestone).needs_refresh());
        assert!(!DeleteOutcome::Skipped(SkipReason::Unsaved).needs_refresh());
    }

    #[test]
    fn new_event_opens_on_today() {
        let mut editor = EventEditor::new(time!(9:00));
        editor.open_new_today(date!(2024 - 05 - 20), None);
        let form = editor.form().unwrap();
        assert!(matches!(editor.state(), EditorState::Creating { .. }));
        assert_eq!(form.date, date!(2024 - 05 - 20));
        assert!(form.title.is_empty());
    }
}
