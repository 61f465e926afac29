use std::sync::atomic::{AtomicU64, Ordering};

use time::{Date, OffsetDateTime};

use crate::{
    calendar::{
        CalendarError, CalendarEvent, DeleteOutcome, EventEditor, EventId, MonthGrid, SaveOutcome,
        aggregate::aggregate,
        grid::{shift_months, start_of_month},
    },
    config::CalendarConfig,
    core::db::{Appointment, Project, StoreResult, StudioStore},
};

/// Which projects contribute milestones. Appointments are always loaded in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientScope {
    #[default]
    All,
    Client(i64),
}

impl ClientScope {
    pub fn client_id(self) -> Option<i64> {
        match self {
            ClientScope::All => None,
            ClientScope::Client(id) => Some(id),
        }
    }
}

/// Hands out increasing load generations; only the newest may commit.
#[derive(Debug, Default)]
pub struct LoadTracker {
    latest: AtomicU64,
}

impl LoadTracker {
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest() == generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub month: Date,
    pub scope: ClientScope,
}

#[derive(Debug)]
pub struct PendingLoad {
    ticket: LoadTicket,
}

impl PendingLoad {
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    pub async fn fetch<S: StudioStore>(self, store: &S) -> LoadedCalendar {
        let projects = async {
            match self.ticket.scope {
                ClientScope::All => store.get_projects().await,
                ClientScope::Client(id) => store.get_projects_by_client(id).await,
            }
        };
        let result = tokio::try_join!(store.get_appointments(), projects);
        LoadedCalendar {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug)]
pub struct LoadedCalendar {
    pub ticket: LoadTicket,
    pub result: StoreResult<(Vec<Appointment>, Vec<Project>)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    Stale,
}

/// A finished write and the reload that followed it. The write stands even
/// when `refresh_error` is set.
#[derive(Debug)]
pub struct WriteReport<T> {
    pub outcome: T,
    pub refresh_error: Option<CalendarError>,
}

pub fn local_today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// Calendar screen state: month cursor, client scope, merged events, day grid
/// and the event editor, all driven through an injected store.
#[derive(Debug)]
pub struct Calendar<S> {
    store: S,
    config: CalendarConfig,
    scope: ClientScope,
    cursor: Date,
    today: Date,
    events: Vec<CalendarEvent>,
    grid: MonthGrid,
    editor: EventEditor,
    loads: LoadTracker,
}

impl<S: StudioStore> Calendar<S> {
    pub fn new(store: S, config: CalendarConfig, today: Date) -> Self {
        Self {
            store,
            editor: EventEditor::new(config.default_time),
            config,
            scope: ClientScope::All,
            cursor: today,
            today,
            events: Vec::new(),
            grid: MonthGrid::build(today, today, &[]),
            loads: LoadTracker::default(),
        }
    }

    pub fn with_scope(mut self, scope: ClientScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn scope(&self) -> ClientScope {
        self.scope
    }

    pub fn cursor(&self) -> Date {
        self.cursor
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub fn editor(&self) -> &EventEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EventEditor {
        &mut self.editor
    }

    pub fn visible_events(&self, day: Date) -> &[CalendarEvent] {
        self.grid
            .cell(day)
            .map(|cell| cell.visible_events(self.config.max_visible_events))
            .unwrap_or_default()
    }

    pub fn overflow_count(&self, day: Date) -> usize {
        self.grid
            .cell(day)
            .map_or(0, |cell| cell.overflow_count(self.config.max_visible_events))
    }

    pub fn set_today(&mut self, today: Date) {
        self.today = today;
        self.rebuild_grid();
    }

    fn rebuild_grid(&mut self) {
        self.grid = MonthGrid::build(self.cursor, self.today, &self.events);
    }

    pub fn begin_load(&self) -> PendingLoad {
        PendingLoad {
            ticket: LoadTicket {
                generation: self.loads.issue(),
                month: self.cursor,
                scope: self.scope,
            },
        }
    }

    /// Applies a finished load unless a newer one has been started since.
    /// A failed load keeps the previously committed events and grid.
    pub fn commit(&mut self, loaded: LoadedCalendar) -> Result<CommitOutcome, CalendarError> {
        let LoadedCalendar { ticket, result } = loaded;
        if !self.loads.is_current(ticket.generation) {
            tracing::warn!(
                generation = ticket.generation,
                latest = self.loads.latest(),
                "discarding stale calendar load"
            );
            return Ok(CommitOutcome::Stale);
        }
        let (appointments, projects) = result.map_err(|e| {
            tracing::error!(error = %e, "calendar load failed, keeping previous state");
            CalendarError::LoadFailure(e)
        })?;
        self.events = aggregate(&appointments, &projects);
        self.grid = MonthGrid::build(ticket.month, self.today, &self.events);
        tracing::debug!(
            generation = ticket.generation,
            month = %start_of_month(ticket.month),
            events = self.events.len(),
            "calendar load applied"
        );
        Ok(CommitOutcome::Applied)
    }

    pub async fn load(&mut self) -> Result<(), CalendarError> {
        let pending = self.begin_load();
        let loaded = pending.fetch(&self.store).await;
        self.commit(loaded).map(|_| ())
    }

    pub async fn go_to(&mut self, day: Date) -> Result<(), CalendarError> {
        self.cursor = day;
        self.rebuild_grid();
        self.load().await
    }

    pub async fn next_month(&mut self) -> Result<(), CalendarError> {
        self.go_to(shift_months(self.cursor, 1)).await
    }

    pub async fn previous_month(&mut self) -> Result<(), CalendarError> {
        self.go_to(shift_months(self.cursor, -1)).await
    }

    pub async fn go_to_today(&mut self) -> Result<(), CalendarError> {
        self.go_to(self.today).await
    }

    pub async fn set_scope(&mut self, scope: ClientScope) -> Result<(), CalendarError> {
        self.scope = scope;
        self.load().await
    }

    pub fn open_day(&mut self, day: Date) {
        self.editor.open_day(day, self.scope.client_id());
    }

    pub fn open_new_today(&mut self) {
        self.editor.open_new_today(self.today, self.scope.client_id());
    }

    /// Returns false when no loaded event has that id.
    pub fn open_event(&mut self, id: EventId) -> bool {
        match self.events.iter().find(|event| event.id == id) {
            Some(event) => {
                self.editor.open_event(event);
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editor.cancel();
    }

    /// Errors only when the store rejects the write. A reload failure after
    /// a successful write is carried in the report.
    pub async fn save_event(&mut self) -> Result<WriteReport<SaveOutcome>, CalendarError> {
        let outcome = self
            .editor
            .save(&self.store)
            .await
            .map_err(CalendarError::Save)?;
        let refresh_error = if outcome.needs_refresh() {
            self.load().await.err()
        } else {
            None
        };
        Ok(WriteReport {
            outcome,
            refresh_error,
        })
    }

    pub async fn delete_event(&mut self) -> Result<WriteReport<DeleteOutcome>, CalendarError> {
        let outcome = self
            .editor
            .delete(&self.store)
            .await
            .map_err(CalendarError::Delete)?;
        let refresh_error = if outcome.needs_refresh() {
            self.load().await.err()
        } else {
            None
        };
        Ok(WriteReport {
            outcome,
            refresh_error,
        })
    }
}
