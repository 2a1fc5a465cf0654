//! Messenger-facing abstractions: the outbound port, inbound update model and decorators.

pub mod port;
pub mod throttled;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;
