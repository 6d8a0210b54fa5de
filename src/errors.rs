/// Domain-specific error types for the analytics engine.
/// Every condition here is local and recoverable: callers decide whether to
/// warn, fall back to a default, or refuse the action that produced it.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("payoff curve is empty")]
    EmptyCurve,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("market data error: {0}")]
    MarketData(String),

    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    /// Input-class errors are the caller's fault; everything else comes from
    /// collaborators or the environment.
    #[inline]
    pub fn is_input(&self) -> bool {
        matches!(self, EngineError::InvalidInput(_) | EngineError::EmptyCurve)
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        EngineError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Parse(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Reject non-finite values before they reach a formula.
#[inline]
pub(crate) fn ensure_finite(name: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidInput(format!("{name} must be finite, got {value}")))
    }
}

#[inline]
pub(crate) fn ensure_positive(name: &str, value: f64) -> EngineResult<()> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidInput(format!("{name} must be > 0, got {value}")))
    }
}

#[inline]
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> EngineResult<()> {
    ensure_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidInput(format!("{name} must be >= 0, got {value}")))
    }
}
