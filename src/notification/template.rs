//! Custom-message template expansion.
//!
//! Explicit sends may carry a free-form message template that the embedding
//! host expands against the current build (environment variables, token
//! macros, and so on). Expansion failure degrades the output instead of
//! aborting the send.

use tracing::error;

use crate::Result;
use crate::build::BuildRecord;

/// Prefix substituted in front of a template that failed to expand.
const UNPROCESSABLE_PREFIX: &str = "[UNPROCESSABLE] ";

/// Host-provided template expansion.
pub trait MessageTemplateExpander: Send + Sync {
    fn expand(&self, template: &str, build: &BuildRecord) -> Result<String>;
}

/// Expander that returns the template untouched. Default for hosts without a
/// macro engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughExpander;

impl MessageTemplateExpander for PassthroughExpander {
    fn expand(&self, template: &str, _build: &BuildRecord) -> Result<String> {
        Ok(template.to_string())
    }
}

/// Expand `template`, substituting a degraded marker copy when the expander
/// fails.
pub(crate) fn expand_or_degrade(
    expander: &dyn MessageTemplateExpander,
    template: &str,
    build: &BuildRecord,
) -> String {
    match expander.expand(template, build) {
        Ok(expanded) => expanded,
        Err(e) => {
            error!(error = %e, "Failed to process custom message");
            format!("{UNPROCESSABLE_PREFIX}{template}")
        }
    }
}
