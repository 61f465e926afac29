use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::core::db::{StoreResult, model::date_or_timestamp};

/// Project phase. Names outside the known track are kept verbatim as `Other`
/// so a stray label never stops a project from loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    Consultation,
    Concept,
    Design,
    Procurement,
    Installation,
    Completed,
    Other(String),
}

impl Phase {
    /// The known phases in track order.
    pub const ALL: [Phase; 6] = [
        Phase::Consultation,
        Phase::Concept,
        Phase::Design,
        Phase::Procurement,
        Phase::Installation,
        Phase::Completed,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Phase::Consultation => "consultation",
            Phase::Concept => "concept",
            Phase::Design => "design",
            Phase::Procurement => "procurement",
            Phase::Installation => "installation",
            Phase::Completed => "completed",
            Phase::Other(name) => name,
        }
    }

    /// Position on the phase track; `None` for `Other`.
    pub fn index(&self) -> Option<usize> {
        Phase::ALL.iter().position(|phase| phase == self)
    }

    /// Share of the phase track reached, counting the current phase as done.
    /// Phases off the track report 0.
    pub fn progress_percent(&self) -> u8 {
        self.index().map_or(0, |index| {
            let done = index as u32 + 1;
            ((done * 100) / Phase::ALL.len() as u32) as u8
        })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Phase {
    fn from(value: &str) -> Self {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == value)
            .unwrap_or_else(|| Phase::Other(value.to_string()))
    }
}

impl From<String> for Phase {
    fn from(value: String) -> Self {
        match Phase::from(value.as_str()) {
            Phase::Other(_) => Phase::Other(value),
            known => known,
        }
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "Id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "date_or_timestamp")]
    pub target_date: Date,
    pub phase: Phase,
    #[serde(default)]
    pub client_id: Option<i64>,
}

pub trait ProjectRepository {
    fn get_projects(&self) -> impl Future<Output = StoreResult<Vec<Project>>>;
    fn get_project_by_id(&self, id: i64) -> impl Future<Output = StoreResult<Project>>;
    fn get_projects_by_client(&self, client_id: i64) -> impl Future<Output = StoreResult<Vec<Project>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_round_trip_through_strings() {
        for phase in Phase::ALL {
            assert_eq!(Phase::from(phase.as_str()), phase);
        }
        assert_eq!(Phase::from("completion"), Phase::Other("completion".to_string()));
        assert_eq!(String::from(Phase::Other("completion".to_string())), "completion");
    }

    #[test]
    fn progress_tracks_phase_order() {
        assert_eq!(Phase::Consultation.progress_percent(), 16);
        assert_eq!(Phase::Design.progress_percent(), 50);
        assert_eq!(Phase::Completed.progress_percent(), 100);
        assert_eq!(Phase::from("completion").progress_percent(), 0);
    }

    #[test]
    fn unknown_phase_deserializes_as_other() {
        let phase: Phase = serde_json::from_str(r#""completion""#).unwrap();
        assert_eq!(phase, Phase::Other("completion".to_string()));
        assert_eq!(serde_json::to_string(&Phase::Design).unwrap(), r#""design""#);
    }
}
