mod models;
mod outcome;
mod validate;

pub use models::{clamp_count, BatchRequest, HttpMethod, MAX_REQUESTS, MIN_REQUESTS};
pub use outcome::{
    AttemptFailure, BatchEvent, BatchReport, BatchResult, DispatchFault, RequestOutcome, RunState,
};
pub use validate::{pre_flight_check, ValidationError};
