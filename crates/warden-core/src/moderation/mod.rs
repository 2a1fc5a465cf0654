//! Group moderation: rule evaluation, offense escalation and the service that applies them.

pub mod classifier;
pub mod ledger;
pub mod service;

pub use classifier::{Classifier, MessageContent, Verdict, ViolationReason};
pub use ledger::{Consequence, OffenseLedger};
pub use service::{ModerationOutcome, ModerationService};
