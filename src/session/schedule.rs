// Season schedule and driver roster shapes returned by the data service

use serde::{Deserialize, Serialize};

use super::DriverCode;

/// A session of an event as offered in the schedule (`name` is for display, `value` is the identifier).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOption {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RaceEvent {
    pub round_number: u32,
    pub event_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub sessions: Vec<SessionOption>,
}

impl RaceEvent {
    /// The session to preselect: qualifying or race if the event has one,
    /// otherwise the first session listed.
    pub fn default_session(&self) -> Option<&SessionOption> {
        self.sessions
            .iter()
            .find(|s| s.value == "Q" || s.value == "R")
            .or_else(|| self.sessions.first())
    }

    pub fn has_session(&self, identifier: &str) -> bool {
        self.sessions.iter().any(|s| s.value == identifier)
    }
}

pub fn find_event(schedule: &[RaceEvent], round_number: u32) -> Option<&RaceEvent> {
    schedule.iter().find(|e| e.round_number == round_number)
}

/// Roster entry for a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DriverInfo {
    pub abbreviation: DriverCode,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
}
