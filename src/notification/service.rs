//! Notification service.
//!
//! Wires classifier, composer, and delivery pipeline for the three entry
//! points the host orchestration system calls: build started, build
//! completed, and the scripted explicit send. Automatic notifications never
//! abort the build they report on; only explicit sends may escalate.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::build::{BuildHistory, BuildRecord};
use crate::config::NotifierConfig;
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::notification::classifier::{decide_on_completed, decide_on_started};
use crate::notification::composer::MessageComposer;
use crate::notification::delivery::{DeliveryPipeline, MessageGateway};
use crate::notification::template::{
    MessageTemplateExpander, PassthroughExpander, expand_or_degrade,
};

/// Orchestrates one job's build notifications.
pub struct NotificationService {
    config: NotifierConfig,
    recipients: Vec<String>,
    composer: MessageComposer,
    pipeline: DeliveryPipeline,
    expander: Arc<dyn MessageTemplateExpander>,
}

impl NotificationService {
    pub fn new(
        config: NotifierConfig,
        gateway: Arc<dyn MessageGateway>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self::with_expander(config, gateway, store, Arc::new(PassthroughExpander))
    }

    /// Like [`NotificationService::new`], with a host-supplied template
    /// expander for explicit-send custom messages.
    pub fn with_expander(
        config: NotifierConfig,
        gateway: Arc<dyn MessageGateway>,
        store: Arc<dyn CredentialStore>,
        expander: Arc<dyn MessageTemplateExpander>,
    ) -> Self {
        let recipients = config.recipient_list();
        let composer = MessageComposer::new(config.root_url.clone());
        Self {
            config,
            recipients,
            composer,
            pipeline: DeliveryPipeline::new(gateway, store),
            expander,
        }
    }

    /// Notify that a build started, when `on_start` is configured.
    ///
    /// Returns whether every recipient received the message; `true` when the
    /// event is suppressed.
    pub async fn on_build_started(&self, build: &BuildRecord, history: &BuildHistory) -> bool {
        let decision = decide_on_started(&self.config);
        if !decision.should_fire {
            debug!(build = build.id, "Start notification suppressed");
            return true;
        }

        let text = self
            .composer
            .compose_with_status(build, history, decision.status);
        self.publish(&text).await
    }

    /// Classify a completed build against its history and notify when a
    /// configured transition matches.
    pub async fn on_build_completed(&self, build: &BuildRecord, history: &BuildHistory) -> bool {
        let decision = decide_on_completed(build, history, &self.config);
        if !decision.should_fire {
            debug!(
                build = build.id,
                status = ?decision.status,
                "Completion notification suppressed"
            );
            return true;
        }

        let text = self
            .composer
            .compose_with_status(build, history, decision.status);
        self.publish(&text).await
    }

    /// Scripted-pipeline send: the status message, followed by the expanded
    /// custom message when present.
    ///
    /// On aggregate failure returns `Err` when `fail_on_error`, otherwise
    /// logs and returns `Ok(false)`.
    pub async fn send_explicit(
        &self,
        build: &BuildRecord,
        history: &BuildHistory,
        message: Option<&str>,
        fail_on_error: bool,
    ) -> Result<bool> {
        let mut text = self.composer.compose(build, history);
        if let Some(template) = message {
            text.push(' ');
            text.push_str(&expand_or_degrade(self.expander.as_ref(), template, build));
        }

        let delivered = self.publish(&text).await;
        if !delivered {
            if fail_on_error {
                return Err(Error::DeliveryFailed(
                    "notification failed; see logs for details".to_string(),
                ));
            }
            error!(build = build.id, "Notification failed; see logs for details");
        }
        Ok(delivered)
    }

    /// Deliver `text` to all recipients. Delivery problems are reported as a
    /// boolean plus log lines, never as a crash of the triggering build.
    async fn publish(&self, text: &str) -> bool {
        match self
            .pipeline
            .deliver(&self.config.credentials_id, &self.recipients, text)
            .await
        {
            Ok(report) => {
                for failed in report.failed_recipients() {
                    warn!(
                        recipient = %failed.recipient,
                        http_status = ?failed.http_status,
                        "Recipient delivery failed"
                    );
                }
                report.all_delivered()
            }
            Err(e) => {
                error!(error = %e, "Notification delivery failed");
                false
            }
        }
    }
}
