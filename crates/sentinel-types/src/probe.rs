use std::time::Duration;

/// Outcome of a single probe execution, produced by a `Prober` and consumed
/// by the state machine.
///
/// This type is intentionally opaque to the probe mechanism: the core never
/// inspects `output`/`error` beyond using them as the status `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub success: bool,
    pub error: Option<String>,
    pub output: String,
    pub latency: Duration,
}

impl ProbeResult {
    pub fn success(output: impl Into<String>, latency: Duration) -> Self {
        Self {
            success: true,
            error: None,
            output: output.into(),
            latency,
        }
    }

    pub fn failure(error: impl Into<String>, latency: Duration) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            output: String::new(),
            latency,
        }
    }

    /// The message a status should record for this result: the error text
    /// when present, otherwise the raw output.
    pub fn message(&self) -> &str {
        match &self.error {
            Some(e) => e,
            None => &self.output,
        }
    }
}
