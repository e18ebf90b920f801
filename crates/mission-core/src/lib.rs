pub mod archive;
pub mod check;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod exec_log;
pub mod finalize;
pub mod fs;
pub mod id;
pub mod io;
pub mod lifecycle;
pub mod mission;
pub mod paths;
pub mod pause;
pub mod plan;
pub mod types;
pub mod vcs;
pub mod writer;

pub use error::{MissionError, Result};
