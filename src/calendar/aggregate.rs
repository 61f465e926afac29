//! Merges appointments and project target dates into one event sequence.

use time::{Date, UtcOffset};

use crate::{
    calendar::{CalendarEvent, EventId},
    core::db::{Appointment, ColorTag, Phase, Project},
};

pub const APPOINTMENT_COLOR: ColorTag = ColorTag::Blue;

/// Milestone color by phase; anything off the known track is gray.
pub fn phase_color(phase: &Phase) -> ColorTag {
    match phase {
        Phase::Consultation => ColorTag::Yellow,
        Phase::Concept => ColorTag::Blue,
        Phase::Design => ColorTag::Purple,
        Phase::Procurement => ColorTag::Orange,
        Phase::Installation => ColorTag::Green,
        Phase::Completed | Phase::Other(_) => ColorTag::Gray,
    }
}

impl From<&Appointment> for CalendarEvent {
    fn from(appointment: &Appointment) -> Self {
        CalendarEvent {
            id: EventId::Appointment(appointment.id),
            title: appointment.title.clone(),
            description: appointment.description.clone(),
            // Day membership is decided on the UTC calendar date.
            date: appointment.date.to_offset(UtcOffset::UTC).date(),
            time: Some(appointment.time),
            client_id: appointment.client_id,
            color: APPOINTMENT_COLOR,
        }
    }
}

impl From<&Project> for CalendarEvent {
    fn from(project: &Project) -> Self {
        CalendarEvent {
            id: EventId::Milestone {
                project_id: project.id,
            },
            title: format!("{} - Target Date", project.name),
            description: project.description.clone(),
            date: project.target_date,
            time: None,
            client_id: project.client_id,
            color: phase_color(&project.phase),
        }
    }
}

/// Every appointment in store order, followed by one milestone per project.
pub fn aggregate(appointments: &[Appointment], projects: &[Project]) -> Vec<CalendarEvent> {
    appointments
        .iter()
        .map(CalendarEvent::from)
        .chain(projects.iter().map(CalendarEvent::from))
        .collect()
}

pub fn events_on(events: &[CalendarEvent], day: Date) -> impl Iterator<Item = &CalendarEvent> {
    events.iter().filter(move |event| event.is_on(day))
}
