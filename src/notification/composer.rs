//! Message composition.
//!
//! Renders the final status string for one build event. Total function:
//! composition never fails, malformed root URLs only lose the host prefix.

use std::time::Duration;

use tracing::error;
use url::Url;

use crate::build::{BuildHistory, BuildRecord};
use crate::notification::classifier::{StatusKind, classify};

/// Composes one immutable message string per invocation.
#[derive(Debug, Clone, Default)]
pub struct MessageComposer {
    root_url: Option<String>,
}

impl MessageComposer {
    /// `root_url` is the build system's public URL; its host prefixes every
    /// message when it parses.
    pub fn new(root_url: Option<String>) -> Self {
        Self { root_url }
    }

    /// Compose the status message for `build`, classifying it against
    /// `history`.
    pub fn compose(&self, build: &BuildRecord, history: &BuildHistory) -> String {
        self.compose_with_status(build, history, classify(build, history))
    }

    /// Compose with an already-derived status kind.
    pub fn compose_with_status(
        &self,
        build: &BuildRecord,
        history: &BuildHistory,
        status: StatusKind,
    ) -> String {
        let mut message = String::new();

        if let Some(raw) = self.root_url.as_deref() {
            match Url::parse(raw) {
                Ok(url) => {
                    if let Some(host) = url.host_str() {
                        message.push_str(&escape(host));
                        message.push(' ');
                    }
                }
                Err(e) => error!(url = %raw, error = %e, "Root URL is not valid"),
            }
        }

        message.push_str(&escape_display_name(&build.job_name));
        message.push_str(" - ");
        message.push_str(&escape_display_name(&build.display_name));
        message.push(' ');
        message.push_str(&escape(status.label()));
        message.push_str(" after ");
        message.push_str(&duration_text(build, history, status));

        message
    }
}

/// Duration suffix text.
///
/// Back-to-normal reports the recovery span: elapsed time between the current
/// build's start and the previous successful build's start, "unknown" when no
/// prior success exists. Every other status reports the build's own duration.
fn duration_text(build: &BuildRecord, history: &BuildHistory, status: StatusKind) -> String {
    if status != StatusKind::BackToNormal {
        return format_time_span(build.duration);
    }

    match history.previous_successful() {
        Some(prev) => {
            let diff = build
                .start_time
                .signed_duration_since(prev.start_time)
                .to_std()
                .unwrap_or(Duration::ZERO);
            format_time_span(diff)
        }
        None => "unknown".to_string(),
    }
}

/// Format a time span into a compact human-readable string.
pub fn format_time_span(span: Duration) -> String {
    let total_secs = span.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// HTML-special-character escaping, applied to all inserted text.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Display-name escaping: the HTML pass first, then a markdown pass that
/// backslash-prefixes characters which may occur in job or build display
/// names. Order matters; only display-name segments get the second pass.
pub fn escape_display_name(display_name: &str) -> String {
    escape(display_name)
        .replace('~', "\\~")
        .replace('*', "\\*")
        .replace('_', "\\_")
        .replace('`', "\\`")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::build::BuildResult;

    fn build(result: BuildResult, start_secs: i64, duration: Duration) -> BuildRecord {
        BuildRecord {
            id: 7,
            result,
            start_time: Utc.timestamp_opt(start_secs, 0).unwrap(),
            duration,
            display_name: "#7".to_string(),
            job_name: "web \u{bb} deploy".to_string(),
        }
    }

    #[test]
    fn test_escape_html_characters() {
        assert_eq!(escape("a & b < c > d"), "a &amp; b &lt; c &gt; d");
    }

    #[test]
    fn test_escape_display_name_markdown() {
        assert_eq!(escape_display_name("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_display_name("x~y`z"), "x\\~y\\`z");
    }

    #[test]
    fn test_escape_display_name_html_first() {
        // The HTML pass runs first; the resulting entities carry no markdown
        // characters, so nothing else changes.
        assert_eq!(escape_display_name("<script>"), "&lt;script&gt;");
    }

    #[test]
    fn test_compose_success_message() {
        let composer = MessageComposer::new(Some("https://ci.example.org/".to_string()));
        let current = build(BuildResult::Success, 5000, Duration::from_secs(125));
        let history = BuildHistory::default();

        let message = composer.compose(&current, &history);
        assert_eq!(
            message,
            "ci.example.org web \u{bb} deploy - #7 \u{1F44D} Success after 2m 5s"
        );
    }

    #[test]
    fn test_compose_without_root_url() {
        let composer = MessageComposer::new(None);
        let current = build(BuildResult::Failure, 5000, Duration::from_secs(9));

        let message = composer.compose(&current, &BuildHistory::default());
        assert!(message.starts_with("web \u{bb} deploy - #7 "));
        assert!(message.ends_with("\u{1F6D1} Failure after 9s"));
    }

    #[test]
    fn test_compose_invalid_root_url_drops_prefix() {
        let composer = MessageComposer::new(Some("not a url".to_string()));
        let current = build(BuildResult::Success, 5000, Duration::from_secs(9));

        let message = composer.compose(&current, &BuildHistory::default());
        assert!(message.starts_with("web \u{bb} deploy"));
    }

    #[test]
    fn test_back_to_normal_uses_recovery_span() {
        let composer = MessageComposer::new(None);
        // Previous success started one hour and a minute before the current
        // build.
        let prev = BuildRecord {
            id: 3,
            result: BuildResult::Success,
            start_time: Utc.timestamp_opt(1000, 0).unwrap(),
            duration: Duration::from_secs(10),
            display_name: "#3".to_string(),
            job_name: "job".to_string(),
        };
        let failed = BuildRecord {
            result: BuildResult::Failure,
            id: 4,
            display_name: "#4".to_string(),
            ..prev.clone()
        };
        let history = BuildHistory::new(vec![failed, prev]);
        let current = build(BuildResult::Success, 1000 + 3660, Duration::from_secs(5));

        let message = composer.compose(&current, &history);
        assert!(message.contains("\u{1F44D} Back to normal after 1h 1m 0s"));
    }

    #[test]
    fn test_back_to_normal_without_prior_success_is_unreachable_but_unknown() {
        // compose_with_status lets callers force the status; the duration
        // falls back to the literal "unknown".
        let composer = MessageComposer::new(None);
        let current = build(BuildResult::Success, 5000, Duration::from_secs(5));

        let message = composer.compose_with_status(
            &current,
            &BuildHistory::default(),
            StatusKind::BackToNormal,
        );
        assert!(message.ends_with("after unknown"));
    }

    #[test]
    fn test_status_labels_are_fixed() {
        assert_eq!(StatusKind::Starting.label(), "\u{1F64F} Running");
        assert_eq!(StatusKind::NotBuilt.label(), "\u{26A0}\u{FE0F} Not built");
        assert_eq!(StatusKind::Unknown.label(), "\u{2753} Unknown");
    }

    #[test]
    fn test_format_time_span() {
        assert_eq!(format_time_span(Duration::from_secs(30)), "30s");
        assert_eq!(format_time_span(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_time_span(Duration::from_secs(3661)), "1h 1m 1s");
    }
}
