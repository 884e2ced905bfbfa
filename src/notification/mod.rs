//! Build-status notification core.
//!
//! Three tightly coupled pieces plus their orchestrator:
//! - transition classifier: (current result, history) -> fire/suppress + status kind
//! - message composer: build summary + status kind -> escaped status string
//! - delivery pipeline: fan-out over authenticated HTTP POST with aggregate outcome

pub mod classifier;
pub mod composer;
pub mod delivery;
pub mod service;
pub mod template;

pub use classifier::{NotificationDecision, StatusKind, classify, decide_on_completed, decide_on_started};
pub use composer::MessageComposer;
pub use delivery::{
    DeliveryPipeline, DeliveryReport, DeliveryResult, DirectMessageGateway, MESSAGE_API_URL,
    MessageGateway,
};
pub use service::NotificationService;
pub use template::{MessageTemplateExpander, PassthroughExpander};
