use crate::error::MissionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// MissionType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MissionType {
    #[default]
    #[serde(rename = "WET")]
    Wet,
    #[serde(rename = "DRY")]
    Dry,
}

impl MissionType {
    pub fn as_str(self) -> &'static str {
        match self {
            MissionType::Wet => "WET",
            MissionType::Dry => "DRY",
        }
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionType {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WET" => Ok(MissionType::Wet),
            "DRY" => Ok(MissionType::Dry),
            _ => Err(MissionError::InvalidMissionType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// MissionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Planning,
    Clarifying,
    Planned,
    Active,
    Executed,
    Completed,
    Failed,
}

impl MissionStatus {
    pub fn all() -> &'static [MissionStatus] {
        &[
            MissionStatus::Planning,
            MissionStatus::Clarifying,
            MissionStatus::Planned,
            MissionStatus::Active,
            MissionStatus::Executed,
            MissionStatus::Completed,
            MissionStatus::Failed,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MissionStatus::Planning => "planning",
            MissionStatus::Clarifying => "clarifying",
            MissionStatus::Planned => "planned",
            MissionStatus::Active => "active",
            MissionStatus::Executed => "executed",
            MissionStatus::Completed => "completed",
            MissionStatus::Failed => "failed",
        }
    }

    /// Edges a command may take when it rewrites the status field.
    pub fn can_transition_to(self, target: MissionStatus) -> bool {
        use MissionStatus::*;
        matches!(
            (self, target),
            (Planning, Planned)
                | (Planning, Clarifying)
                | (Clarifying, Planning)
                | (Clarifying, Planned)
                | (Planned, Active)
                | (Active, Active)
                | (Failed, Active)
                | (Active, Executed)
                | (Active, Failed)
                | (Executed, Failed)
                | (Executed, Completed)
                | (Completed, Completed)
        )
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionStatus {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MissionStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| MissionError::InvalidStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// The command on whose behalf the check gate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    #[default]
    None,
    Plan,
    Apply,
    Complete,
    Debug,
}

impl Context {
    pub fn as_str(self) -> &'static str {
        match self {
            Context::None => "",
            Context::Plan => "plan",
            Context::Apply => "apply",
            Context::Complete => "complete",
            Context::Debug => "debug",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Context {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(Context::None),
            "plan" => Ok(Context::Plan),
            "apply" => Ok(Context::Apply),
            "complete" => Ok(Context::Complete),
            "debug" => Ok(Context::Debug),
            other => Err(MissionError::InvalidContext(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FileAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Create,
    Modify,
}

// ---------------------------------------------------------------------------
// LogLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Success,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "SUCCESS" => Ok(LogLevel::Success),
            _ => Err(MissionError::InvalidLogLevel(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
