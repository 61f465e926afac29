use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::{Time, macros::time};

use crate::{
    calendar::MAX_VISIBLE_EVENTS,
    core::db::{Latency, hh_mm},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Events shown per day cell before the "+N more" summary.
    pub max_visible_events: usize,
    /// Time pre-filled when creating an event.
    #[serde(with = "hh_mm")]
    pub default_time: Time,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            max_visible_events: MAX_VISIBLE_EVENTS,
            default_time: time!(9:00),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub calendar: CalendarConfig,
    pub latency: Latency,
}

impl AppConfig {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("Failed to parse configuration")
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration {:?}", path))?;
        Self::from_json(&raw)
    }
}
