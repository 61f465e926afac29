use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::db::{Appointment, Project, StoreResult};

const SAMPLE_STUDIO: &str = include_str!("../../../data/sample_studio.json");

/// Initial store contents, in the JSON layout of the studio's mock data files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioData {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl StudioData {
    pub fn from_json(raw: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        tracing::debug!(path = %path.as_ref().display(), "loaded seed data");
        Self::from_json(&raw)
    }

    /// The bundled demo studio.
    pub fn sample() -> StoreResult<Self> {
        Self::from_json(SAMPLE_STUDIO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::Phase;

    #[test]
    fn sample_studio_parses() {
        let data = StudioData::sample().unwrap();
        assert!(!data.appointments.is_empty());
        assert!(!data.projects.is_empty());
        assert!(data.projects.iter().any(|p| p.phase == Phase::Design));
    }

    #[test]
    fn accepts_original_field_names() {
        let data = StudioData::from_json(
            r#"{
                "appointments": [{
                    "Id": 4, "title": "Walkthrough", "description": "",
                    "date": "2024-05-10T09:00:00.000Z", "clientId": null, "time": "09:00"
                }],
                "projects": [{
                    "Id": 2, "name": "Loft", "description": "Open plan",
                    "targetDate": "2024-07-01", "phase": "procurement", "clientId": 3
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(data.appointments[0].id, 4);
        assert_eq!(data.appointments[0].client_id, None);
        assert_eq!(data.projects[0].client_id, Some(3));
    }

    #[test]
    fn unlisted_phase_keeps_the_seed_loadable() {
        let data = StudioData::from_json(
            r#"{
                "appointments": [],
                "projects": [{
                    "Id": 9, "name": "Atelier", "targetDate": "2024-05-24",
                    "phase": "completion", "clientId": 1
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(data.projects[0].phase, Phase::Other("completion".to_string()));
    }
}
