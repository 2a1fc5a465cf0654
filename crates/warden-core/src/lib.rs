//! Core domain + application logic for the community warden bot.
//!
//! This crate is framework-agnostic. Telegram lives behind the `MessagingPort` trait,
//! implemented in the adapter crate.

pub mod community;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod moderation;
pub mod notice;
pub mod relay;
pub mod texts;

pub use errors::{Error, Result};
