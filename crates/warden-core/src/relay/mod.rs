//! Private contact relay between participants and the operator.

pub mod correlator;
pub mod service;

pub use correlator::RelayCorrelator;
pub use service::{OperatorRoute, RelayOutcome, RelayService, Selection};
