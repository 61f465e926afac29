use std::fmt;

use time::{Date, Time};

use crate::core::db::ColorTag;

/// Identity of a calendar entry.
///
/// Appointments keep their store id; milestones are derived from a project and
/// render as `project-{id}`, so the two spaces never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventId {
    Appointment(i64),
    Milestone { project_id: i64 },
}

impl EventId {
    pub fn kind(self) -> EventKind {
        match self {
            EventId::Appointment(_) => EventKind::Appointment,
            EventId::Milestone { .. } => EventKind::Milestone,
        }
    }

    pub fn appointment_id(self) -> Option<i64> {
        match self {
            EventId::Appointment(id) => Some(id),
            EventId::Milestone { .. } => None,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Appointment(id) => write!(f, "{id}"),
            EventId::Milestone { project_id } => write!(f, "project-{project_id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventKind {
    #[default]
    Appointment,
    Milestone,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Appointment => "appointment",
            EventKind::Milestone => "milestone",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the merged calendar view. Rebuilt on every load, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: Date,
    pub time: Option<Time>,
    pub client_id: Option<i64>,
    pub color: ColorTag,
}

impl CalendarEvent {
    pub fn kind(&self) -> EventKind {
        self.id.kind()
    }

    pub fn is_on(&self, day: Date) -> bool {
        self.date == day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_ids_are_prefixed() {
        assert_eq!(EventId::Appointment(7).to_string(), "7");
        assert_eq!(EventId::Milestone { project_id: 7 }.to_string(), "project-7");
        assert_ne!(EventId::Appointment(7), EventId::Milestone { project_id: 7 });
    }

    #[test]
    fn kind_follows_id() {
        assert_eq!(EventId::Appointment(1).kind(), EventKind::Appointment);
        assert_eq!(EventId::Milestone { project_id: 1 }.kind().as_str(), "milestone");
        assert_eq!(EventId::Milestone { project_id: 1 }.appointment_id(), None);
    }
}
