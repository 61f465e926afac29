use thiserror::Error;

use crate::core::db::StoreError;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("failed to load calendar data: {0}")]
    LoadFailure(#[source] StoreError),
    #[error("failed to save event: {0}")]
    Save(#[source] StoreError),
    #[error("failed to delete event: {0}")]
    Delete(#[source] StoreError),
}

impl CalendarError {
    /// Short message for a transient notification.
    pub fn user_message(&self) -> &'static str {
        match self {
            CalendarError::LoadFailure(_) => "Failed to load calendar data",
            CalendarError::Save(_) => "Failed to save event",
            CalendarError::Delete(_) => "Failed to delete event",
        }
    }

    pub fn store_error(&self) -> &StoreError {
        match self {
            CalendarError::LoadFailure(e) | CalendarError::Save(e) | CalendarError::Delete(e) => e,
        }
    }
}
