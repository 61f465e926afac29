use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use designhub_calendar::core::db::{
    Appointment, AppointmentRepository, AppointmentUpdate, Latency, MemoryStore, NewAppointment,
    Phase, Project, ProjectRepository, StoreError, StoreResult, StudioData,
};
use time::{Date, OffsetDateTime, macros::date};

/// "Today" for every calendar test; inside the sample studio's month.
pub const TODAY: Date = date!(2024 - 05 - 20);

/// A MemoryStore holding the bundled sample studio, without simulated latency.
pub fn sample_store() -> MemoryStore {
    MemoryStore::new(
        StudioData::sample().expect("Failed to parse sample studio"),
        Latency::none(),
    )
}

pub fn make_appointment(id: i64, title: &str, at: OffsetDateTime, client_id: Option<i64>) -> Appointment {
    Appointment {
        id,
        title: title.to_string(),
        description: String::new(),
        date: at,
        client_id,
        time: at.time(),
        created_at: None,
    }
}

pub fn make_new_appointment(title: &str, at: OffsetDateTime) -> NewAppointment {
    NewAppointment {
        title: title.to_string(),
        description: format!("{title} notes"),
        date: at,
        client_id: Some(1),
        time: at.time(),
    }
}

pub fn make_project(id: i64, name: &str, target: Date, phase: Phase, client_id: Option<i64>) -> Project {
    Project {
        id,
        name: name.to_string(),
        description: String::new(),
        target_date: target,
        phase,
        client_id,
    }
}

/// Wraps a MemoryStore and fails list reads while `fail_loads` is set.
#[derive(Debug, Clone)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_loads: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_loads: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_loads.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.fail_loads.load(Ordering::SeqCst) {
            Err(StoreError::InvalidRecord("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

impl AppointmentRepository for FlakyStore {
    async fn get_appointments(&self) -> StoreResult<Vec<Appointment>> {
        self.check()?;
        self.inner.get_appointments().await
    }

    async fn get_appointment_by_id(&self, id: i64) -> StoreResult<Appointment> {
        self.inner.get_appointment_by_id(id).await
    }

    async fn get_appointments_by_client(&self, client_id: i64) -> StoreResult<Vec<Appointment>> {
        self.inner.get_appointments_by_client(client_id).await
    }

    async fn add_appointment(&self, appointment: &NewAppointment) -> StoreResult<Appointment> {
        self.inner.add_appointment(appointment).await
    }

    async fn update_appointment(&self, id: i64, update: &AppointmentUpdate) -> StoreResult<Appointment> {
        self.inner.update_appointment(id, update).await
    }

    async fn delete_appointment(&self, id: i64) -> StoreResult<Appointment> {
        self.inner.delete_appointment(id).await
    }

    async fn get_upcoming(&self, now: OffsetDateTime, days: i64) -> StoreResult<Vec<Appointment>> {
        self.inner.get_upcoming(now, days).await
    }
}

impl ProjectRepository for FlakyStore {
    async fn get_projects(&self) -> StoreResult<Vec<Project>> {
        self.check()?;
        self.inner.get_projects().await
    }

    async fn get_project_by_id(&self, id: i64) -> StoreResult<Project> {
        self.inner.get_project_by_id(id).await
    }

    async fn get_projects_by_client(&self, client_id: i64) -> StoreResult<Vec<Project>> {
        self.check()?;
        self.inner.get_projects_by_client(client_id).await
    }
}
