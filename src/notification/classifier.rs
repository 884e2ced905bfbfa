//! Transition classification.
//!
//! Pure functions mapping (current result, history) to a notification
//! decision. No state persists between calls; the history supplied by the
//! orchestrator is the single source of truth and every decision is
//! recomputed fresh from it.

use serde::{Deserialize, Serialize};

use crate::build::{BuildHistory, BuildRecord, BuildResult};
use crate::config::NotifierConfig;

/// Status label attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Starting,
    BackToNormal,
    StillFailing,
    Success,
    Failure,
    Aborted,
    NotBuilt,
    Unstable,
    Unknown,
}

impl StatusKind {
    /// Fixed human-readable label, icon glyph included.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Starting => "\u{1F64F} Running",
            Self::BackToNormal => "\u{1F44D} Back to normal",
            Self::StillFailing => "\u{1F6D1} Still Failing",
            Self::Success => "\u{1F44D} Success",
            Self::Failure => "\u{1F6D1} Failure",
            Self::Aborted => "\u{26A0} Aborted",
            Self::NotBuilt => "\u{26A0}\u{FE0F} Not built",
            Self::Unstable => "\u{26A0} Unstable",
            Self::Unknown => "\u{2753} Unknown",
        }
    }
}

/// Outcome of classifying one build event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationDecision {
    pub should_fire: bool,
    pub status: StatusKind,
}

/// Nearest completed non-aborted prior result.
///
/// Defaults to `Success` when every prior build was aborted or the history is
/// empty, so a first-ever build that aborts is reported as aborted instead of
/// being compared against nothing.
fn previous_result(history: &BuildHistory) -> BuildResult {
    history
        .previous_non_aborted()
        .map(|r| r.result)
        .unwrap_or(BuildResult::Success)
}

/// Derive the status kind for the current build.
pub fn classify(current: &BuildRecord, history: &BuildHistory) -> StatusKind {
    if !current.result.is_complete() {
        return StatusKind::Starting;
    }

    let prev = previous_result(history);

    // Back to normal only when the job has actually succeeded at some point;
    // a previously unstable job that now succeeds also counts.
    if current.result == BuildResult::Success
        && (prev == BuildResult::Failure || prev == BuildResult::Unstable)
        && history.ever_succeeded()
    {
        return StatusKind::BackToNormal;
    }
    if current.result == BuildResult::Failure && prev == BuildResult::Failure {
        return StatusKind::StillFailing;
    }

    match current.result {
        BuildResult::Success => StatusKind::Success,
        BuildResult::Failure => StatusKind::Failure,
        BuildResult::Aborted => StatusKind::Aborted,
        BuildResult::NotBuilt => StatusKind::NotBuilt,
        BuildResult::Unstable => StatusKind::Unstable,
        BuildResult::InProgress => StatusKind::Unknown,
    }
}

/// Decide whether a completed build fires a notification.
pub fn decide_on_completed(
    current: &BuildRecord,
    history: &BuildHistory,
    config: &NotifierConfig,
) -> NotificationDecision {
    let prev = previous_result(history);
    let result = current.result;

    let should_fire = (result == BuildResult::Aborted && config.on_aborted)
        || (result == BuildResult::Failure && prev != BuildResult::Failure && config.on_failure)
        || (result == BuildResult::Failure
            && prev == BuildResult::Failure
            && config.on_repeated_failure)
        || (result == BuildResult::NotBuilt && config.on_not_built)
        || (result == BuildResult::Success
            && (prev == BuildResult::Failure || prev == BuildResult::Unstable)
            && config.on_back_to_normal)
        || (result == BuildResult::Success && config.on_success)
        || (result == BuildResult::Unstable && config.on_unstable);

    NotificationDecision {
        should_fire,
        status: classify(current, history),
    }
}

/// Decide whether a starting build fires a notification. Independent of
/// history.
pub fn decide_on_started(config: &NotifierConfig) -> NotificationDecision {
    NotificationDecision {
        should_fire: config.on_start,
        status: StatusKind::Starting,
    }
}
