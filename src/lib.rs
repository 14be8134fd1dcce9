pub mod auth;
pub mod batch;
#[cfg(feature = "cli")]
pub mod config;
pub mod dispatcher;
#[cfg(feature = "cli")]
pub mod env;
#[cfg(feature = "cli")]
pub mod interactive;
#[cfg(feature = "cli")]
pub mod render;
#[cfg(feature = "cli")]
pub mod shell;

pub use auth::{AuthConfig, AuthKind, AuthMaterial};
pub use batch::{BatchEvent, BatchReport, BatchRequest, HttpMethod, RequestOutcome, RunState};
pub use dispatcher::{CancelHandle, DispatchOptions, Dispatcher, RunHandle};
