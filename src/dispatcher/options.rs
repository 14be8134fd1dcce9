use std::time::Duration;

/// Upper bound for a single attempt, connect through last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    pub timeout: Duration,
    /// Keep the first N bytes of each response body for display.
    pub preview_bytes: Option<usize>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            preview_bytes: None,
        }
    }
}
