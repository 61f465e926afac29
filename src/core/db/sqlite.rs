use std::{path::Path, sync::Arc};

use sqlx::{Connection, FromRow};
use time::OffsetDateTime;

use crate::core::db::{
    Appointment, AppointmentRepository, AppointmentUpdate, NewAppointment, Phase, Project,
    ProjectRepository, StoreError, StoreResult, StudioData,
    model::{format_date, format_hh_mm, format_timestamp, parse_date_or_timestamp, parse_hh_mm, parse_timestamp},
    state::StoreState,
};

const APPOINTMENT_COLUMNS: &str = "id, title, description, date, client_id, time, created_at";
const PROJECT_COLUMNS: &str = "id, name, description, target_date, phase, client_id";

/// SQLite-backed store. Clones share one pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    state: Arc<StoreState>,
}

impl SqliteStore {
    pub async fn open<P: AsRef<Path>>(db_file: P) -> StoreResult<Self> {
        Ok(Self {
            state: Arc::new(StoreState::open(db_file).await?),
        })
    }

    pub async fn in_memory() -> StoreResult<Self> {
        Ok(Self {
            state: Arc::new(StoreState::in_memory().await?),
        })
    }

    /// Explicitly flush and close the database.
    pub async fn close(&self) -> StoreResult<()> {
        self.state.close().await
    }

    /// Insert or replace every record in `data`, keeping the given ids.
    pub async fn import(&self, data: &StudioData) -> StoreResult<()> {
        let mut conn = self.state.conn().await?;
        let mut tx = conn.begin().await?;
        for appointment in &data.appointments {
            let created_at = appointment.created_at.map(format_timestamp).transpose()?;
            sqlx::query(
                r#"INSERT OR REPLACE INTO appointment
                (id, title, description, date, client_id, time, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            )
            .bind(appointment.id)
            .bind(&appointment.title)
            .bind(&appointment.description)
            .bind(format_timestamp(appointment.date)?)
            .bind(appointment.client_id)
            .bind(format_hh_mm(appointment.time))
            .bind(created_at)
            .execute(&mut *tx)
            .await?;
        }
        for project in &data.projects {
            sqlx::query(
                r#"INSERT OR REPLACE INTO project
                (id, name, description, target_date, phase, client_id)
                VALUES ($1, $2, $3, $4, $5, $6)"#,
            )
            .bind(project.id)
            .bind(&project.name)
            .bind(&project.description)
            .bind(format_date(project.target_date))
            .bind(project.phase.as_str())
            .bind(project.client_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        tracing::info!(
            appointments = data.appointments.len(),
            projects = data.projects.len(),
            "imported studio data"
        );
        Ok(())
    }

    async fn fetch_appointments(&self, where_clause: &str, bind: Option<i64>) -> StoreResult<Vec<Appointment>> {
        let mut conn = self.state.conn().await?;
        let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointment {where_clause} ORDER BY id ASC");
        let mut query = sqlx::query_as::<_, AppointmentRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        query
            .fetch_all(&mut **conn)
            .await?
            .into_iter()
            .map(Appointment::try_from)
            .collect()
    }

    async fn fetch_projects(&self, where_clause: &str, bind: Option<i64>) -> StoreResult<Vec<Project>> {
        let mut conn = self.state.conn().await?;
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM project {where_clause} ORDER BY id ASC");
        let mut query = sqlx::query_as::<_, ProjectRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        query
            .fetch_all(&mut **conn)
            .await?
            .into_iter()
            .map(Project::try_from)
            .collect()
    }
}

#[derive(Debug, FromRow)]
struct AppointmentRow {
    id: i64,
    title: String,
    description: String,
    date: String,
    client_id: Option<i64>,
    time: String,
    created_at: Option<String>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = StoreError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            title: row.title,
            description: row.description,
            date: parse_timestamp(&row.date)?,
            client_id: row.client_id,
            time: parse_hh_mm(&row.time)?,
            created_at: row.created_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: i64,
    name: String,
    description: String,
    target_date: String,
    phase: String,
    client_id: Option<i64>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: row.id,
            name: row.name,
            description: row.description,
            target_date: parse_date_or_timestamp(&row.target_date)?,
            phase: Phase::from(row.phase),
            client_id: row.client_id,
        })
    }
}

impl AppointmentRepository for SqliteStore {
    async fn get_appointments(&self) -> StoreResult<Vec<Appointment>> {
        let appointments = self.fetch_appointments("", None).await?;
        tracing::debug!(count = appointments.len(), "listed appointments");
        Ok(appointments)
    }

    async fn get_appointment_by_id(&self, id: i64) -> StoreResult<Appointment> {
        self.fetch_appointments("WHERE id = $1", Some(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::appointment_not_found(id))
    }

    async fn get_appointments_by_client(&self, client_id: i64) -> StoreResult<Vec<Appointment>> {
        self.fetch_appointments("WHERE client_id = $1", Some(client_id)).await
    }

    async fn add_appointment(&self, appointment: &NewAppointment) -> StoreResult<Appointment> {
        let mut conn = self.state.conn().await?;
        let sql = format!(
            r#"INSERT INTO appointment (id, title, description, date, client_id, time, created_at)
            VALUES ((SELECT COALESCE(MAX(id), 0) + 1 FROM appointment), $1, $2, $3, $4, $5, $6)
            RETURNING {APPOINTMENT_COLUMNS}"#
        );
        let row = sqlx::query_as::<_, AppointmentRow>(&sql)
            .bind(&appointment.title)
            .bind(&appointment.description)
            .bind(format_timestamp(appointment.date)?)
            .bind(appointment.client_id)
            .bind(format_hh_mm(appointment.time))
            .bind(format_timestamp(OffsetDateTime::now_utc())?)
            .fetch_one(&mut **conn)
            .await?;
        let created = Appointment::try_from(row)?;
        tracing::info!(id = created.id, title = %created.title, "created appointment");
        Ok(created)
    }

    async fn update_appointment(&self, id: i64, update: &AppointmentUpdate) -> StoreResult<Appointment> {
        let mut conn = self.state.conn().await?;
        let mut tx = conn.begin().await?;
        let select = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointment WHERE id = $1");
        let row = sqlx::query_as::<_, AppointmentRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::appointment_not_found(id))?;
        let mut appointment = Appointment::try_from(row)?;
        update.apply(&mut appointment);
        sqlx::query(
            r#"UPDATE appointment SET
                title = $1,
                description = $2,
                date = $3,
                client_id = $4,
                time = $5
            WHERE id = $6"#,
        )
        .bind(&appointment.title)
        .bind(&appointment.description)
        .bind(format_timestamp(appointment.date)?)
        .bind(appointment.client_id)
        .bind(format_hh_mm(appointment.time))
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!(id, "updated appointment");
        Ok(appointment)
    }

    async fn delete_appointment(&self, id: i64) -> StoreResult<Appointment> {
        let mut conn = self.state.conn().await?;
        let sql = format!("DELETE FROM appointment WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}");
        let row = sqlx::query_as::<_, AppointmentRow>(&sql)
            .bind(id)
            .fetch_optional(&mut **conn)
            .await?
            .ok_or_else(|| StoreError::appointment_not_found(id))?;
        tracing::info!(id, "deleted appointment");
        Appointment::try_from(row)
    }

    async fn get_upcoming(&self, now: OffsetDateTime, days: i64) -> StoreResult<Vec<Appointment>> {
        // Stored offsets may differ, so the window is checked after parsing.
        Ok(self
            .get_appointments()
            .await?
            .into_iter()
            .filter(|a| a.is_upcoming(now, days))
            .collect())
    }
}

impl ProjectRepository for SqliteStore {
    async fn get_projects(&self) -> StoreResult<Vec<Project>> {
        let projects = self.fetch_projects("", None).await?;
        tracing::debug!(count = projects.len(), "listed projects");
        Ok(projects)
    }

    async fn get_project_by_id(&self, id: i64) -> StoreResult<Project> {
        self.fetch_projects("WHERE id = $1", Some(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::project_not_found(id))
    }

    async fn get_projects_by_client(&self, client_id: i64) -> StoreResult<Vec<Project>> {
        self.fetch_projects("WHERE client_id = $1", Some(client_id)).await
    }
}
