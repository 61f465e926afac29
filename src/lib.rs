pub mod calendar;
pub mod config;
pub mod core;

pub use calendar::{
    Calendar, CalendarError, CalendarEvent, ClientScope, DayCell, EventEditor, EventId, EventKind,
    MonthGrid, SaveOutcome,
};
pub use config::{AppConfig, CalendarConfig};
pub use crate::core::db::{MemoryStore, SqliteStore, StoreError, StudioData};
