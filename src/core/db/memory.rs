use std::{sync::Arc, time::Duration as StdDuration};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::core::db::{
    Appointment, AppointmentRepository, AppointmentUpdate, NewAppointment, Project,
    ProjectRepository, StoreError, StoreResult, StudioData,
};

/// Simulated round-trip time per store operation, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Latency {
    pub list_ms: u64,
    pub by_id_ms: u64,
    pub by_client_ms: u64,
    pub create_ms: u64,
    pub update_ms: u64,
    pub delete_ms: u64,
    pub upcoming_ms: u64,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list_ms: 300,
            by_id_ms: 200,
            by_client_ms: 250,
            create_ms: 400,
            update_ms: 350,
            delete_ms: 250,
            upcoming_ms: 200,
        }
    }
}

impl Latency {
    pub fn none() -> Self {
        Self {
            list_ms: 0,
            by_id_ms: 0,
            by_client_ms: 0,
            create_ms: 0,
            update_ms: 0,
            delete_ms: 0,
            upcoming_ms: 0,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    appointments: RwLock<Vec<Appointment>>,
    projects: RwLock<Vec<Project>>,
}

/// In-memory appointment and project store.
///
/// Clones share the same collections; separate `MemoryStore::new` calls never do.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<MemoryState>,
    latency: Latency,
}

impl MemoryStore {
    pub fn new(data: StudioData, latency: Latency) -> Self {
        Self {
            state: Arc::new(MemoryState {
                appointments: RwLock::new(data.appointments),
                projects: RwLock::new(data.projects),
            }),
            latency,
        }
    }

    pub fn empty() -> Self {
        Self::new(StudioData::default(), Latency::none())
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    async fn delay(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(StdDuration::from_millis(ms)).await;
        }
    }
}

impl AppointmentRepository for MemoryStore {
    async fn get_appointments(&self) -> StoreResult<Vec<Appointment>> {
        self.delay(self.latency.list_ms).await;
        let appointments = self.state.appointments.read().await;
        tracing::debug!(count = appointments.len(), "listed appointments");
        Ok(appointments.clone())
    }

    async fn get_appointment_by_id(&self, id: i64) -> StoreResult<Appointment> {
        self.delay(self.latency.by_id_ms).await;
        self.state
            .appointments
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::appointment_not_found(id))
    }

    async fn get_appointments_by_client(&self, client_id: i64) -> StoreResult<Vec<Appointment>> {
        self.delay(self.latency.by_client_ms).await;
        Ok(self
            .state
            .appointments
            .read()
            .await
            .iter()
            .filter(|a| a.client_id == Some(client_id))
            .cloned()
            .collect())
    }

    async fn add_appointment(&self, appointment: &NewAppointment) -> StoreResult<Appointment> {
        self.delay(self.latency.create_ms).await;
        let mut appointments = self.state.appointments.write().await;
        let id = appointments.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let created = Appointment::from_new(id, appointment, OffsetDateTime::now_utc());
        appointments.push(created.clone());
        tracing::info!(id, title = %created.title, "created appointment");
        Ok(created)
    }

    async fn update_appointment(&self, id: i64, update: &AppointmentUpdate) -> StoreResult<Appointment> {
        self.delay(self.latency.update_ms).await;
        let mut appointments = self.state.appointments.write().await;
        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::appointment_not_found(id))?;
        update.apply(appointment);
        tracing::info!(id, "updated appointment");
        Ok(appointment.clone())
    }

    async fn delete_appointment(&self, id: i64) -> StoreResult<Appointment> {
        self.delay(self.latency.delete_ms).await;
        let mut appointments = self.state.appointments.write().await;
        let index = appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StoreError::appointment_not_found(id))?;
        let removed = appointments.remove(index);
        tracing::info!(id, "deleted appointment");
        Ok(removed)
    }

    async fn get_upcoming(&self, now: OffsetDateTime, days: i64) -> StoreResult<Vec<Appointment>> {
        self.delay(self.latency.upcoming_ms).await;
        Ok(self
            .state
            .appointments
            .read()
            .await
            .iter()
            .filter(|a| a.is_upcoming(now, days))
            .cloned()
            .collect())
    }
}

impl ProjectRepository for MemoryStore {
    async fn get_projects(&self) -> StoreResult<Vec<Project>> {
        self.delay(self.latency.list_ms).await;
        let projects = self.state.projects.read().await;
        tracing::debug!(count = projects.len(), "listed projects");
        Ok(projects.clone())
    }

    async fn get_project_by_id(&self, id: i64) -> StoreResult<Project> {
        self.delay(self.latency.by_id_ms).await;
        self.state
            .projects
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::project_not_found(id))
    }

    async fn get_projects_by_client(&self, client_id: i64) -> StoreResult<Vec<Project>> {
        self.delay(self.latency.by_client_ms).await;
        Ok(self
            .state
            .projects
            .read()
            .await
            .iter()
            .filter(|p| p.client_id == Some(client_id))
            .cloned()
            .collect())
    }
}
