mod appointment;
mod error;
mod memory;
mod model;
mod project;
mod seed;
mod sqlite;
mod state;

pub use appointment::{Appointment, AppointmentRepository, AppointmentUpdate, NewAppointment};
pub use error::{StoreError, StoreResult};
pub use memory::{Latency, MemoryStore};
pub use model::{ColorTag, format_date, format_hh_mm, hh_mm, parse_date, parse_hh_mm};
pub use project::{Phase, Project, ProjectRepository};
pub use seed::StudioData;
pub use sqlite::SqliteStore;

/// A store that serves both appointment and project records.
pub trait StudioStore: AppointmentRepository + ProjectRepository {}

impl<T: AppointmentRepository + ProjectRepository> StudioStore for T {}
