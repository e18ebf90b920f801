use thiserror::Error;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("no active mission: {0} not found")]
    MissionNotFound(String),

    #[error("a live mission already exists: {0}")]
    MissionExists(String),

    #[error("mission id not found: no mission document and no id file")]
    IdNotFound,

    #[error("invalid mission id '{0}': expected YYYYMMDDHHMMSS-NNNN")]
    InvalidId(String),

    #[error("mission file is empty: {0}")]
    EmptyFile(String),

    #[error("missing frontmatter in {0}: expected leading '---' or '# MISSION'")]
    MissingFrontmatter(String),

    #[error("unterminated frontmatter in {0}: no closing '---'")]
    UnterminatedFrontmatter(String),

    #[error("invalid frontmatter: {0}")]
    Frontmatter(String),

    #[error("invalid legacy metadata '{key}': {reason}")]
    LegacyMetadata { key: String, reason: String },

    #[error("section '{0}' is missing or empty")]
    MissingSection(String),

    #[error("unknown mission status: {0}")]
    InvalidStatus(String),

    #[error("unknown command context: {0}")]
    InvalidContext(String),

    #[error("invalid mission type '{0}': expected WET or DRY")]
    InvalidMissionType(String),

    #[error("invalid track '{0}': expected an integer from 1 to 4")]
    InvalidTrack(String),

    #[error("invalid frontmatter pair '{0}': expected key=value")]
    InvalidPair(String),

    #[error("unknown log level: {0}")]
    InvalidLogLevel(String),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("plan step {step} out of range: plan has {count} steps")]
    StepOutOfRange { step: usize, count: usize },

    #[error("mission scope is empty")]
    EmptyScope,

    #[error("paused mission not found: {0}")]
    PausedNotFound(String),

    #[error("no paused missions")]
    NoPausedMissions,

    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(String),

    #[error("baseline checkpoint missing for mission {0}")]
    BaselineMissing(String),

    #[error("reference not found: {0}")]
    RefNotFound(String),

    #[error("nothing to commit")]
    NoChanges,

    #[error("failed to clear checkpoints after deleting {deleted}: {source}")]
    ClearFailed {
        deleted: usize,
        #[source]
        source: Box<MissionError>,
    },

    #[error("{command} failed: {stderr}")]
    Vcs { command: String, stderr: String },

    #[error("version control binary '{0}' not found on PATH")]
    VcsUnavailable(String),

    #[error("check failed: {0}")]
    Check(#[source] Box<MissionError>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MissionError {
    /// True for the not-found family, which some callers absorb.
    pub fn is_not_found(&self) -> bool {
        match self {
            MissionError::MissionNotFound(_)
            | MissionError::IdNotFound
            | MissionError::PausedNotFound(_)
            | MissionError::NoPausedMissions
            | MissionError::CheckpointNotFound(_)
            | MissionError::RefNotFound(_) => true,
            MissionError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MissionError>;
