//! Calendar subsystem: merges appointments and project milestones into one
//! event list, lays it out on a month grid and edits appointments in place.

pub mod aggregate;
mod editor;
mod error;
mod event;
pub mod grid;
mod view;

pub use aggregate::{aggregate, events_on, phase_color};
pub use editor::{DeleteOutcome, EditorState, EventEditor, EventForm, SaveOutcome, SkipReason};
pub use error::CalendarError;
pub use event::{CalendarEvent, EventId, EventKind};
pub use grid::{DayCell, MAX_VISIBLE_EVENTS, MonthGrid, shift_months};
pub use view::{
    Calendar, ClientScope, CommitOutcome, LoadTicket, LoadTracker, LoadedCalendar, PendingLoad,
    WriteReport, local_today,
};
