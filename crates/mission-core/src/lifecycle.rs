use crate::error::{MissionError, Result};
use crate::mission::Mission;
use crate::types::{Context, MissionStatus};
use crate::writer::MissionWriter;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Outcome of consulting the transition table for a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Proceed {
        /// Status the command will move the mission to, if it moves it.
        next: Option<MissionStatus>,
        guidance: String,
    },
    Stop {
        reason: String,
    },
}

impl Decision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Decision::Proceed { .. })
    }

    /// The `next_step` line shown to callers: `PROCEED. ...` or `STOP. ...`.
    pub fn next_step(&self) -> String {
        match self {
            Decision::Proceed { guidance, .. } => format!("PROCEED. {guidance}"),
            Decision::Stop { reason } => format!("STOP. {reason}"),
        }
    }
}

fn proceed(next: Option<MissionStatus>, guidance: impl Into<String>) -> Decision {
    Decision::Proceed {
        next,
        guidance: guidance.into(),
    }
}

fn stop(reason: impl Into<String>) -> Decision {
    Decision::Stop {
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Total function over `(context, status)`. `None` status means no live
/// mission document.
pub fn decide(context: Context, status: Option<MissionStatus>) -> Decision {
    use MissionStatus::*;

    let Some(status) = status else {
        return proceed(
            Some(Planning),
            "No active mission. Analyze the intent, then run 'mission plan new'.",
        );
    };

    match (context, status) {
        (Context::None, s) => proceed(None, format!("Mission status is '{s}'.")),

        (Context::Plan, Planning | Clarifying) => proceed(
            Some(Planned),
            "Mission is being planned. Fill INTENT, SCOPE, PLAN and VERIFICATION, then run 'mission finalize'.",
        ),

        (Context::Apply, Planned) => proceed(
            Some(Active),
            "Mission is planned. Run 'mission apply' to start execution.",
        ),
        (Context::Apply, Active) => proceed(
            Some(Active),
            "Mission is already active. Resume execution from the first unchecked PLAN step.",
        ),
        (Context::Apply, Failed) => proceed(
            Some(Active),
            "Previous execution failed. Run 'mission apply' to retry.",
        ),

        (Context::Complete, Executed) => proceed(
            Some(Completed),
            "Mission executed. Run 'mission complete --message <msg>' to consolidate and archive.",
        ),
        (Context::Complete, Completed) => proceed(
            Some(Completed),
            "Mission already completed. Re-run 'mission complete' to finish archiving.",
        ),

        (Context::Debug, s) => proceed(None, format!("Debugging mission in status '{s}'.")),

        (Context::Plan, s) => stop(format!(
            "A mission already exists with status '{s}'. Complete or pause it before planning a new one."
        )),
        (Context::Apply, s) => stop(format!(
            "Cannot apply a mission with status '{s}'. Only planned, active or failed missions can be applied."
        )),
        (Context::Complete, s) => stop(format!(
            "Cannot complete a mission with status '{s}'. Run 'mission apply' until it is executed."
        )),
    }
}

/// Move the live mission to `target`, refusing edges outside the table.
pub fn transition(writer: &MissionWriter<'_>, target: MissionStatus) -> Result<Mission> {
    let mission = writer.read()?;
    let current = mission.status()?;
    if !current.can_transition_to(target) {
        return Err(MissionError::InvalidTransition {
            from: current.to_string(),
            to: target.to_string(),
        });
    }
    writer.update_status(target)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
