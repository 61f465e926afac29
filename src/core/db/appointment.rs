use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, Time};

use crate::core::db::{StoreResult, model::hh_mm};

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "Id")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(with = "hh_mm")]
    pub time: Time,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub title: String,
    pub description: String,
    pub date: OffsetDateTime,
    pub client_id: Option<i64>,
    pub time: Time,
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
    pub client_id: Option<Option<i64>>,
    pub time: Option<Time>,
}

impl AppointmentUpdate {
    pub(super) fn apply(&self, appointment: &mut Appointment) {
        if let Some(title) = &self.title {
            appointment.title = title.clone();
        }
        if let Some(description) = &self.description {
            appointment.description = description.clone();
        }
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(client_id) = self.client_id {
            appointment.client_id = client_id;
        }
        if let Some(time) = self.time {
            appointment.time = time;
        }
    }
}

impl Appointment {
    pub(super) fn from_new(id: i64, new: &NewAppointment, created_at: OffsetDateTime) -> Self {
        Appointment {
            id,
            title: new.title.clone(),
            description: new.description.clone(),
            date: new.date,
            client_id: new.client_id,
            time: new.time,
            created_at: Some(created_at),
        }
    }

    /// Whether the appointment falls within `[now, now + days]`. A window
    /// reaching past the representable range has no upper bound.
    pub fn is_upcoming(&self, now: OffsetDateTime, days: i64) -> bool {
        if days < 0 {
            return false;
        }
        let end = days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|seconds| now.checked_add(Duration::seconds(seconds)));
        self.date >= now && end.is_none_or(|end| self.date <= end)
    }
}

pub trait AppointmentRepository {
    fn get_appointments(&self) -> impl Future<Output = StoreResult<Vec<Appointment>>>;
    fn get_appointment_by_id(&self, id: i64) -> impl Future<Output = StoreResult<Appointment>>;
    fn get_appointments_by_client(&self, client_id: i64) -> impl Future<Output = StoreResult<Vec<Appointment>>>;
    fn add_appointment(&self, appointment: &NewAppointment) -> impl Future<Output = StoreResult<Appointment>>;
    fn update_appointment(&self, id: i64, update: &AppointmentUpdate) -> impl Future<Output = StoreResult<Appointment>>;
    fn delete_appointment(&self, id: i64) -> impl Future<Output = StoreResult<Appointment>>;
    fn get_upcoming(&self, now: OffsetDateTime, days: i64) -> impl Future<Output = StoreResult<Vec<Appointment>>>;
}
