//! Build records and history as supplied by the host orchestration system.
//!
//! The core only reads these types: history is append-only from the
//! orchestrator's perspective and every classification is recomputed fresh
//! from it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one build attempt.
///
/// Immutable once a build finishes; [`BuildResult::InProgress`] is the
/// transient pseudo-state for builds that have not completed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    Aborted,
    NotBuilt,
    InProgress,
}

impl BuildResult {
    /// Whether this result belongs to a completed build.
    pub fn is_complete(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Unstable => write!(f, "unstable"),
            Self::Failure => write!(f, "failure"),
            Self::Aborted => write!(f, "aborted"),
            Self::NotBuilt => write!(f, "not_built"),
            Self::InProgress => write!(f, "in_progress"),
        }
    }
}

/// One historical build of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Build number within its job.
    pub id: u64,
    pub result: BuildResult,
    pub start_time: DateTime<Utc>,
    /// Wall-clock build duration.
    pub duration: Duration,
    /// Build display name (e.g. "#42").
    pub display_name: String,
    /// Full display name of the owning job.
    pub job_name: String,
}

/// Ordered history of the builds preceding the current one, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildHistory {
    records: Vec<BuildRecord>,
}

impl BuildHistory {
    /// Wrap a newest-first sequence of prior builds.
    pub fn new(records: Vec<BuildRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The immediately preceding build, if any.
    pub fn previous_build(&self) -> Option<&BuildRecord> {
        self.records.first()
    }

    /// Walk backward from the immediately preceding build, skipping aborted
    /// builds, to the nearest completed non-aborted one.
    ///
    /// Aborted builds are transparent to transition detection: a failure,
    /// an abort, then a success is the transition failure -> success.
    pub fn previous_non_aborted(&self) -> Option<&BuildRecord> {
        self.records
            .iter()
            .find(|r| r.result != BuildResult::Aborted)
    }

    /// The most recent prior successful build, if any.
    pub fn previous_successful(&self) -> Option<&BuildRecord> {
        self.records
            .iter()
            .find(|r| r.result == BuildResult::Success)
    }

    /// Whether any prior build ever succeeded.
    pub fn ever_succeeded(&self) -> bool {
        self.previous_successful().is_some()
    }

    /// Iterate prior builds, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &BuildRecord> {
        self.records.iter()
    }
}
