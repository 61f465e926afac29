mod fixtures;
pub use fixtures::*;

// Re-export commonly used types for tests
pub use designhub_calendar::calendar::{
    Calendar, CalendarError, CalendarEvent, ClientScope, CommitOutcome, DeleteOutcome, EditorState,
    EventId, EventKind, SaveOutcome, SkipReason,
};
pub use designhub_calendar::config::CalendarConfig;
pub use designhub_calendar::core::db::{
    Appointment, AppointmentRepository, AppointmentUpdate, ColorTag, Latency, MemoryStore,
    NewAppointment, Phase, Project, ProjectRepository, SqliteStore, StoreError, StudioData,
};
